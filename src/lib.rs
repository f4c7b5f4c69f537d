mod compiler;
mod model;
mod note_encoder;
mod validator;

pub use compiler::*;
pub use model::config::*;
pub use model::song::*;
pub use note_encoder::*;
pub use validator::*;
