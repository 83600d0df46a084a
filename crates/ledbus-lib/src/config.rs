//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{ColorOrder, Rgb};

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# ledbus configuration — broker, strip, and powerline settings.\n\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// MQTT broker hostname or IP. Default: "localhost".
    #[serde(default = "default_broker_host")]
    pub broker_host: String,

    /// MQTT broker port. Default: 1883.
    #[serde(default = "default_broker_port")]
    pub broker_port: u16,

    /// Topic carrying strip control messages. Default: "lights/strip".
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Client identifier presented to the broker. Default: "ledbus".
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Number of LEDs on the strip. Default: 60.
    #[serde(default = "default_pixel_count")]
    pub pixel_count: usize,

    /// GPIO data pin driving the strip. Default: 18 (PWM0).
    #[serde(default = "default_gpio_pin")]
    pub gpio_pin: u8,

    /// DMA channel for the strip driver. Default: 10.
    #[serde(default = "default_dma_channel")]
    pub dma_channel: u8,

    /// Channel order of the strip hardware. Default: "grb" (WS2812).
    #[serde(default = "default_color_order")]
    pub color_order: String,

    /// Remembered color at startup (hex or name). Default: "#FFFFFF".
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Brightness at startup, 0.0..=1.0. Default: 0.5.
    #[serde(default = "default_brightness")]
    pub default_brightness: f32,

    /// Powerline probe/configure command, run once before the message
    /// loop. Empty = skip the bootstrap.
    #[serde(default = "default_plc_probe_command")]
    pub plc_probe_command: String,

    /// Seconds before the powerline probe is killed. Default: 30.
    #[serde(default = "default_plc_timeout_secs")]
    pub plc_timeout_secs: u64,
}

fn default_broker_host() -> String {
    "localhost".into()
}
fn default_broker_port() -> u16 {
    1883
}
fn default_topic() -> String {
    "lights/strip".into()
}
fn default_client_id() -> String {
    "ledbus".into()
}
fn default_pixel_count() -> usize {
    60
}
fn default_gpio_pin() -> u8 {
    18
}
fn default_dma_channel() -> u8 {
    10
}
fn default_color_order() -> String {
    "grb".into()
}
fn default_color() -> String {
    "#FFFFFF".into()
}
fn default_brightness() -> f32 {
    0.5
}
fn default_plc_probe_command() -> String {
    "plctool -i eth0 -m".into()
}
fn default_plc_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Config {
            broker_host: default_broker_host(),
            broker_port: default_broker_port(),
            topic: default_topic(),
            client_id: default_client_id(),
            pixel_count: default_pixel_count(),
            gpio_pin: default_gpio_pin(),
            dma_channel: default_dma_channel(),
            color_order: default_color_order(),
            default_color: default_color(),
            default_brightness: default_brightness(),
            plc_probe_command: default_plc_probe_command(),
            plc_timeout_secs: default_plc_timeout_secs(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `pixel_count` must be at least 1.
    InvalidPixelCount(usize),
    /// `default_brightness` is outside `[0.0, 1.0]`.
    InvalidBrightness(f32),
    /// `default_color` could not be parsed.
    InvalidColor(String),
    /// `color_order` is not one of the six channel permutations.
    InvalidColorOrder(String),
    /// `topic` is empty or whitespace-only.
    EmptyTopic,
    /// `broker_host` is empty or whitespace-only.
    EmptyBrokerHost,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPixelCount(n) => {
                write!(f, "Invalid pixel_count: {n} (must be at least 1)")
            }
            ValidationError::InvalidBrightness(v) => {
                write!(f, "Invalid default_brightness: {v} (must be in 0.0..=1.0)")
            }
            ValidationError::InvalidColor(e) => write!(f, "Invalid default_color: {e}"),
            ValidationError::InvalidColorOrder(e) => write!(f, "{e}"),
            ValidationError::EmptyTopic => write!(f, "Topic cannot be empty"),
            ValidationError::EmptyBrokerHost => write!(f, "Broker host cannot be empty"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ledbus"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from the default path, returning the config and any
    /// parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Load config from an arbitrary path, returning the config and any
    /// parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Save config to an arbitrary path atomically (write to temp file,
    /// then rename). A header comment warns about manual edits.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// The startup color, falling back to white when unparseable.
    pub fn initial_color(&self) -> Rgb {
        match Rgb::parse(&self.default_color) {
            Ok(color) => color,
            Err(e) => {
                log::warn!("{e}, using white");
                Rgb::WHITE
            }
        }
    }

    /// The strip channel order, falling back to GRB when unparseable.
    pub fn order(&self) -> ColorOrder {
        match self.color_order.parse() {
            Ok(order) => order,
            Err(e) => {
                log::warn!("{e}, using grb");
                ColorOrder::Grb
            }
        }
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.pixel_count == 0 {
            errors.push(ValidationError::InvalidPixelCount(self.pixel_count));
        }
        if !(0.0..=1.0).contains(&self.default_brightness) {
            errors.push(ValidationError::InvalidBrightness(self.default_brightness));
        }
        if let Err(e) = Rgb::parse(&self.default_color) {
            errors.push(ValidationError::InvalidColor(e.to_string()));
        }
        if let Err(e) = self.color_order.parse::<ColorOrder>() {
            errors.push(ValidationError::InvalidColorOrder(e));
        }
        if self.topic.trim().is_empty() {
            errors.push(ValidationError::EmptyTopic);
        }
        if self.broker_host.trim().is_empty() {
            errors.push(ValidationError::EmptyBrokerHost);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.pixel_count, 60);
        assert_eq!(config.default_brightness, 0.5);
    }

    #[test]
    fn default_color_is_white() {
        assert_eq!(Config::default().initial_color(), Rgb::WHITE);
    }

    #[test]
    fn default_order_is_grb() {
        assert_eq!(Config::default().order(), ColorOrder::Grb);
    }

    #[test]
    fn initial_color_falls_back_to_white() {
        let config = Config {
            default_color: "not-a-color".into(),
            ..Config::default()
        };
        assert_eq!(config.initial_color(), Rgb::WHITE);
    }

    #[test]
    fn order_falls_back_to_grb() {
        let config = Config {
            color_order: "rgbw".into(),
            ..Config::default()
        };
        assert_eq!(config.order(), ColorOrder::Grb);
    }

    // ── load_from ──

    #[test]
    fn load_from_missing_file_is_defaults_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = Config::load_from(&dir.path().join("nope.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.broker_host, "localhost");
    }

    #[test]
    fn load_from_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "broker_host = \"broker.lan\"\npixel_count = 144\n").unwrap();

        let (config, warnings) = Config::load_from(&path);
        assert!(warnings.is_empty());
        assert_eq!(config.broker_host, "broker.lan");
        assert_eq!(config.pixel_count, 144);
        assert_eq!(config.broker_port, 1883, "unset fields keep defaults");
        assert_eq!(config.topic, "lights/strip");
    }

    #[test]
    fn load_from_garbage_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "broker_host = [this is not toml").unwrap();

        let (config, warnings) = Config::load_from(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("config parse error"));
        assert_eq!(config.broker_host, "localhost");
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let config = Config {
            broker_host: "10.0.0.2".into(),
            topic: "house/strip".into(),
            pixel_count: 144,
            default_color: "green".into(),
            plc_probe_command: String::new(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# ledbus configuration"));

        let (loaded, warnings) = Config::load_from(&path);
        assert!(warnings.is_empty());
        assert_eq!(loaded.broker_host, "10.0.0.2");
        assert_eq!(loaded.topic, "house/strip");
        assert_eq!(loaded.pixel_count, 144);
        assert_eq!(loaded.default_color, "green");
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
    }

    // ── validate ──

    #[test]
    fn validate_zero_pixel_count() {
        let config = Config {
            pixel_count: 0,
            ..Config::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidPixelCount(0)));
    }

    #[test]
    fn validate_brightness_out_of_range() {
        for value in [-0.1, 1.5] {
            let config = Config {
                default_brightness: value,
                ..Config::default()
            };
            let errors = config.validate().unwrap_err();
            assert!(
                errors
                    .iter()
                    .any(|e| matches!(e, ValidationError::InvalidBrightness(_))),
                "{value} should fail validation"
            );
        }
    }

    #[test]
    fn validate_bad_color_and_order() {
        let config = Config {
            default_color: "#XYZ".into(),
            color_order: "rainbow".into(),
            ..Config::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn validate_empty_topic_and_host() {
        let config = Config {
            topic: "  ".into(),
            broker_host: String::new(),
            ..Config::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyTopic));
        assert!(errors.contains(&ValidationError::EmptyBrokerHost));
    }

    #[test]
    fn validate_collects_all_errors() {
        let config = Config {
            pixel_count: 0,
            default_brightness: 7.0,
            topic: String::new(),
            ..Config::default()
        };
        assert_eq!(config.validate().unwrap_err().len(), 3);
    }

    #[test]
    fn validation_error_display() {
        assert_eq!(
            ValidationError::InvalidPixelCount(0).to_string(),
            "Invalid pixel_count: 0 (must be at least 1)"
        );
        assert_eq!(ValidationError::EmptyTopic.to_string(), "Topic cannot be empty");
    }
}
