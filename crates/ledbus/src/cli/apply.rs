//! `apply` subcommand — one-shot strip update without the bus.

use std::path::Path;

use ledbus_lib::LedbusError;
use ledbus_lib::color::Rgb;
use ledbus_lib::controller::StripController;
use ledbus_lib::message::PartialUpdate;
use ledbus_lib::state::StripState;
use ledbus_lib::strip::mock::MockStrip;

use super::{Result, kv, kv_width};

pub(super) fn cmd_apply(
    config_path: Option<&Path>,
    on: bool,
    off: bool,
    brightness: Option<f32>,
    color: Option<String>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let update = PartialUpdate {
        state: if on {
            Some(true)
        } else if off {
            Some(false)
        } else {
            None
        },
        brightness,
        color: color.as_deref().map(Rgb::parse).transpose()?,
    };
    if update.is_empty() {
        return Err(LedbusError::Config(
            "nothing to apply (use --on/--off/--brightness/--color)".into(),
        ));
    }

    let config = super::load_config(config_path);

    let state = if dry_run {
        let strip = MockStrip::new(config.pixel_count);
        let controller = StripController::new(
            strip,
            StripState::with_defaults(
                config.pixel_count,
                config.initial_color(),
                config.default_brightness,
            ),
        );
        let state = controller.apply(&update).map_err(LedbusError::from)?;
        if !json {
            controller.inspect(|_, strip| {
                if let Some(frame) = strip.last_frame() {
                    println!("Frame: {} x {}", frame.len(), state.rendered());
                }
            });
        }
        state
    } else {
        let strip = super::open_strip(&config)?;
        let controller = StripController::new(
            strip,
            StripState::with_defaults(
                config.pixel_count,
                config.initial_color(),
                config.default_brightness,
            ),
        );
        controller.apply(&update).map_err(LedbusError::from)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&state).unwrap());
        return Ok(());
    }

    let w = kv_width(&["State:", "Brightness:", "Color:", "Rendered:"], &[]);
    kv("State:", if state.illuminated() { "on" } else { "off" }, w);
    kv("Brightness:", format_args!("{:.2}", state.brightness()), w);
    kv("Color:", state.color(), w);
    kv("Rendered:", state.rendered(), w);
    Ok(())
}
