//! `config` subcommand — show current configuration and file paths.

use std::path::Path;

use ledbus_lib::LedbusError;
use ledbus_lib::color::Rgb;

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width};

pub(super) fn cmd_config(custom_path: Option<&Path>, init: bool, json: bool) -> Result<()> {
    let config_path = custom_path.map(Path::to_path_buf).or_else(Config::path);

    if init {
        let Some(ref path) = config_path else {
            return Err(LedbusError::Config("no config directory".into()));
        };
        if path.exists() {
            return Err(LedbusError::Config(format!(
                "{} already exists",
                path.display()
            )));
        }
        Config::default().save_to(path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = super::load_config(custom_path);
    let config_exists = config_path.as_ref().map(|p| p.exists()).unwrap_or(false);

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "broker:",
            "topic:",
            "client_id:",
            "pixel_count:",
            "gpio_pin:",
            "color_order:",
            "default_color:",
            "default_brightness:",
            "plc_probe_command:",
            "plc_timeout_secs:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent(
        "broker:",
        format_args!("{}:{}", config.broker_host, config.broker_port),
        w,
    );
    kv_indent("topic:", &config.topic, w);
    kv_indent("client_id:", &config.client_id, w);
    kv_indent("pixel_count:", config.pixel_count, w);
    kv_indent(
        "gpio_pin:",
        format_args!("{} (dma {})", config.gpio_pin, config.dma_channel),
        w,
    );
    kv_indent("color_order:", &config.color_order, w);
    let color_display = match Rgb::parse(&config.default_color) {
        Ok(color) => format!("{} -> {color}", config.default_color),
        Err(_) => format!("{} (invalid)", config.default_color),
    };
    kv_indent("default_color:", &color_display, w);
    kv_indent(
        "default_brightness:",
        format_args!("{:.2}", config.default_brightness),
        w,
    );
    let plc_display = if config.plc_probe_command.trim().is_empty() {
        "(disabled)".to_string()
    } else {
        config.plc_probe_command.clone()
    };
    kv_indent("plc_probe_command:", &plc_display, w);
    kv_indent("plc_timeout_secs:", config.plc_timeout_secs, w);

    if let Err(problems) = config.validate() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}
