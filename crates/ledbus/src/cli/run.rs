//! `run` subcommand — powerline bootstrap, then the bus delivery loop.

use std::path::Path;

use ledbus_lib::LedbusError;
use ledbus_lib::bus::BusSession;
use ledbus_lib::controller::StripController;
use ledbus_lib::plc;
use ledbus_lib::state::StripState;

use super::{RUNNING, Result};

pub(super) fn cmd_run(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    if let Err(problems) = config.validate() {
        for p in &problems {
            log::error!("config: {p}");
        }
        if let Some(first) = problems.first() {
            return Err(LedbusError::Config(first.to_string()));
        }
    }

    println!(
        "ledbus — bridging {}:{} topic `{}` to a {}-pixel strip",
        config.broker_host, config.broker_port, config.topic, config.pixel_count
    );

    // One-time powerline handshake; failure aborts startup.
    let report = plc::run_bootstrap(&config)?;
    if !report.skipped {
        println!("[plc]    network up ({} station records)", report.stations);
    }

    let strip = super::open_strip(&config)?;
    println!(
        "[strip]  {} pixels on GPIO {} ({})",
        config.pixel_count,
        config.gpio_pin,
        config.color_order.to_lowercase()
    );

    let state = StripState::with_defaults(
        config.pixel_count,
        config.initial_color(),
        config.default_brightness,
    );
    let controller = StripController::new(strip, state);

    let session = BusSession::connect(&config)?;
    println!("[bus]    {}:{}, topic `{}`", config.broker_host, config.broker_port, config.topic);
    println!();
    println!("Bridging... (Ctrl+C to stop)");

    session.run(&RUNNING, |payload| controller.handle_payload(payload));

    println!();
    println!("Done.");
    Ok(())
}
