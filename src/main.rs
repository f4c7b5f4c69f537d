use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use song_compiler::{Args, compile_batch};

fn main() -> Result<()> {
    // Stage reporting goes to info; default the filter there so plain runs show it.
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("rhythm-machine song compiler v{}", env!("CARGO_PKG_VERSION"));

    let summary = compile_batch(&args.inputs, args.dry);

    if args.dry {
        info!(
            "Dry run finished: {} of {} chart(s) valid..!",
            summary.validated,
            args.inputs.len()
        );
    } else {
        info!(
            "Compiled {} of {} chart(s)..!",
            summary.compiled,
            args.inputs.len()
        );
    }

    if summary.skipped > 0 {
        warn!("Skipped {} input(s); see the messages above", summary.skipped);
    }

    Ok(())
}
