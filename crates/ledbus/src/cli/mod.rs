//! CLI subcommands — daemon loop, one-shot updates, bootstrap, config.

mod apply;
mod bootstrap_cmd;
mod config_cmd;
mod run;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use ledbus_lib::config::Config;
pub(super) use ledbus_lib::error::Result;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the bridge: powerline bootstrap, then the message loop
    Run,

    /// Apply a one-shot update to the strip without the bus
    Apply {
        /// Turn the strip on
        #[arg(long, conflicts_with = "off")]
        on: bool,
        /// Turn the strip off
        #[arg(long)]
        off: bool,
        /// Brightness in 0.0..=1.0
        #[arg(long)]
        brightness: Option<f32>,
        /// Color (hex like "#00FF00" or a name like "green")
        #[arg(long)]
        color: Option<String>,
        /// Render to an in-memory strip and print the frame instead of hardware
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the powerline probe alone and report the result
    Bootstrap,

    /// Show current configuration and file paths
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Load config from an explicit path, or the default platform path.
pub(super) fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(p) => {
            let (config, warnings) = Config::load_from(p);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

/// Open the real strip backend from config.
#[cfg(feature = "ws281x")]
pub(super) fn open_strip(config: &Config) -> Result<ledbus_lib::strip::ws281x::Ws281xStrip> {
    Ok(ledbus_lib::strip::ws281x::Ws281xStrip::open(
        config.gpio_pin,
        config.dma_channel,
        config.pixel_count,
        config.order(),
    )?)
}

/// Open the real strip backend from config.
///
/// This build carries no hardware backend; `run` and `apply` (without
/// `--dry-run`) report it instead of silently driving a fake strip.
#[cfg(not(feature = "ws281x"))]
pub(super) fn open_strip(_config: &Config) -> Result<ledbus_lib::strip::mock::MockStrip> {
    Err(ledbus_lib::strip::StripError::InitFailed(
        "built without a hardware backend (enable the `ws281x` feature)".into(),
    )
    .into())
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, config_path: Option<&Path>, json: bool) -> Result<()> {
    match cmd {
        Command::Run => {
            if json {
                warn_json_unsupported("run");
            }
            run::cmd_run(config_path)
        }
        Command::Apply {
            on,
            off,
            brightness,
            color,
            dry_run,
        } => apply::cmd_apply(config_path, on, off, brightness, color, dry_run, json),
        Command::Bootstrap => {
            if json {
                warn_json_unsupported("bootstrap");
            }
            bootstrap_cmd::cmd_bootstrap(config_path)
        }
        Command::Config { init } => config_cmd::cmd_config(config_path, init, json),
    }
}


#[cfg(test)]
mod json_struct_tests {
    use super::*;

    #[test]
    fn config_output_complete() {
        let output = ConfigOutput {
            config_file: Some("/home/user/.config/ledbus/config.toml".into()),
            config_file_exists: true,
            settings: Config::default(),
        };
        let json = serde_json::to_value(&output).unwrap();

        assert!(json["config_file"].is_string());
        assert_eq!(json["config_file_exists"], true);
        assert_eq!(json["settings"]["broker_host"], "localhost");
        assert_eq!(json["settings"]["broker_port"], 1883);
        assert_eq!(json["settings"]["topic"], "lights/strip");
        assert_eq!(json["settings"]["pixel_count"], 60);
    }

    #[test]
    fn config_output_missing_path_is_null() {
        let output = ConfigOutput {
            config_file: None,
            config_file_exists: false,
            settings: Config::default(),
        };
        let json = serde_json::to_value(&output).unwrap();
        assert!(json["config_file"].is_null());
    }
}
