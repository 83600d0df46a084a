//! ledbus — MQTT to LED strip bridge for powerline-attached light strips.

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

mod cli;

/// Shared shutdown flag — set by Ctrl+C handler.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(
    name = "ledbus",
    version,
    about = "MQTT to LED strip bridge for powerline-attached light strips"
)]
struct Args {
    /// Output as JSON (for config, apply)
    #[arg(long, global = true)]
    json: bool,

    /// Use an alternate config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    ctrlc::set_handler(move || {
        RUNNING.store(false, Ordering::SeqCst);
    })
    .ok();

    if let Err(e) = cli::run(args.command, args.config.as_deref(), args.json) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
