//! `bootstrap` subcommand — run the powerline probe alone.

use std::path::Path;

use ledbus_lib::plc;

use super::Result;

pub(super) fn cmd_bootstrap(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);

    let report = plc::run_bootstrap(&config)?;
    if report.skipped {
        println!("No powerline probe command configured (set `plc_probe_command`).");
    } else {
        println!(
            "Powerline bootstrap OK ({} station records).",
            report.stations
        );
    }
    Ok(())
}
