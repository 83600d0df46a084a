//! Bus message decoding — JSON payload to partial update.
//!
//! A control message is a JSON object in which every recognized key is
//! optional; absent keys mean "no change". Unknown keys are ignored.

use std::fmt;

use serde_json::Value;

use crate::color::Rgb;

// ── Error type ──

/// Payload decoding errors. Every variant means the whole message is
/// dropped; decoding never partially applies a payload.
#[derive(Debug)]
pub enum DecodeError {
    /// Payload is not a JSON object at all.
    Syntax(String),
    /// A recognized key holds a value of the wrong shape.
    Field { key: &'static str, reason: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Syntax(e) => write!(f, "Unparseable payload: {e}"),
            DecodeError::Field { key, reason } => write!(f, "Bad field `{key}`: {reason}"),
        }
    }
}

impl std::error::Error for DecodeError {}

pub type Result<T> = std::result::Result<T, DecodeError>;

// ── Partial update ──

/// A message-derived record where each field is independently optional.
///
/// Out-of-range brightness is NOT rejected here; it decodes successfully
/// and the reconciler ignores it (a policy choice, not a failure).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialUpdate {
    /// On/off. Absent means no change to illumination.
    pub state: Option<bool>,
    /// Uniform brightness. Absent means no change.
    pub brightness: Option<f32>,
    /// Remembered color. Absent means no change.
    pub color: Option<Rgb>,
}

impl PartialUpdate {
    /// True when no field is present (the message changes nothing).
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.brightness.is_none() && self.color.is_none()
    }

    /// Decode a raw bus payload.
    ///
    /// - `state`: `"on"`/`"off"`, case-insensitive. Any other *string* is
    ///   tolerated and leaves the field absent; a non-string is an error.
    /// - `brightness`: any JSON number (range checked later, not here).
    /// - `color`: array of exactly three integers in `0..=255`.
    pub fn from_payload(payload: &[u8]) -> Result<PartialUpdate> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|e| DecodeError::Syntax(e.to_string()))?;
        let map = value
            .as_object()
            .ok_or_else(|| DecodeError::Syntax("payload is not a JSON object".into()))?;

        let state = match map.get("state") {
            None => None,
            Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "on" => Some(true),
                "off" => Some(false),
                other => {
                    log::debug!("unrecognized state value {other:?}, leaving state unchanged");
                    None
                }
            },
            Some(other) => {
                return Err(DecodeError::Field {
                    key: "state",
                    reason: format!("expected \"on\" or \"off\", got {other}"),
                });
            }
        };

        let brightness = match map.get("brightness") {
            None => None,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) => Some(v as f32),
                None => {
                    return Err(DecodeError::Field {
                        key: "brightness",
                        reason: format!("not representable as a float: {n}"),
                    });
                }
            },
            Some(other) => {
                return Err(DecodeError::Field {
                    key: "brightness",
                    reason: format!("expected a number, got {other}"),
                });
            }
        };

        let color = match map.get("color") {
            None => None,
            Some(Value::Array(items)) => Some(color_from_array(items)?),
            Some(other) => {
                return Err(DecodeError::Field {
                    key: "color",
                    reason: format!("expected [r, g, b], got {other}"),
                });
            }
        };

        Ok(PartialUpdate {
            state,
            brightness,
            color,
        })
    }
}

fn color_from_array(items: &[Value]) -> Result<Rgb> {
    if items.len() != 3 {
        return Err(DecodeError::Field {
            key: "color",
            reason: format!("expected 3 channels, got {}", items.len()),
        });
    }
    let mut channels = [0u8; 3];
    for (i, item) in items.iter().enumerate() {
        let n = item.as_i64().ok_or_else(|| DecodeError::Field {
            key: "color",
            reason: format!("channel {i} is not an integer: {item}"),
        })?;
        channels[i] = u8::try_from(n).map_err(|_| DecodeError::Field {
            key: "color",
            reason: format!("channel {i} out of range: {n}"),
        })?;
    }
    Ok(Rgb::new(channels[0], channels[1], channels[2]))
}
