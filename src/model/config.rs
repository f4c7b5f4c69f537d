use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "song_compiler",
    version,
    about = "Generates .note files for the rhythm-machine project from human-readable .yaml files."
)]
pub struct Args {
    /// One or more .yaml chart files to compile.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Validate the charts without writing any .note files.
    #[arg(short, long, default_value_t = false)]
    pub dry: bool,
}
