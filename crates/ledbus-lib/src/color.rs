//! Color parsing, formatting, and strip channel ordering.
//!
//! Colors are plain 8-bit RGB triples. Strip hardware frequently wires the
//! channels in a different order (WS2812 chips are GRB); [`ColorOrder`]
//! names the six permutations so backends can reorder at the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single RGB triple, shared by every "on" pixel of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse a color string.
    ///
    /// Accepts:
    /// - Hex: `"#FF0000"`, `"FF0000"`, `"#ff0000"`
    /// - Named: `"red"`, `"green"`, `"blue"`, `"white"`, `"orange"`,
    ///   `"yellow"`, `"purple"`, `"cyan"`, `"off"`/`"black"`
    pub fn parse(s: &str) -> crate::error::Result<Rgb> {
        let s = s.trim();

        // Named colors
        match s.to_lowercase().as_str() {
            "red" => return Ok(Rgb::new(0xFF, 0x00, 0x00)),
            "green" => return Ok(Rgb::new(0x00, 0xFF, 0x00)),
            "blue" => return Ok(Rgb::new(0x00, 0x00, 0xFF)),
            "white" => return Ok(Rgb::WHITE),
            "orange" => return Ok(Rgb::new(0xFF, 0x80, 0x00)),
            "yellow" => return Ok(Rgb::new(0xFF, 0xFF, 0x00)),
            "purple" => return Ok(Rgb::new(0x80, 0x00, 0xFF)),
            "cyan" => return Ok(Rgb::new(0x00, 0xFF, 0xFF)),
            "off" | "black" => return Ok(Rgb::BLACK),
            _ => {}
        }

        // Hex color
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return Err(crate::LedbusError::Color(format!(
                "Invalid color: {s} (use #RRGGBB or a color name)"
            )));
        }
        let val = u32::from_str_radix(hex, 16)
            .map_err(|_| crate::LedbusError::Color(format!("Invalid hex color: {s}")))?;
        Ok(Rgb::new(
            ((val >> 16) & 0xFF) as u8,
            ((val >> 8) & 0xFF) as u8,
            (val & 0xFF) as u8,
        ))
    }

    /// The three channels in the given wire order.
    pub fn channels(self, order: ColorOrder) -> [u8; 3] {
        match order {
            ColorOrder::Rgb => [self.r, self.g, self.b],
            ColorOrder::Rbg => [self.r, self.b, self.g],
            ColorOrder::Grb => [self.g, self.r, self.b],
            ColorOrder::Gbr => [self.g, self.b, self.r],
            ColorOrder::Brg => [self.b, self.r, self.g],
            ColorOrder::Bgr => [self.b, self.g, self.r],
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Channel order of the strip hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOrder {
    Rgb,
    Rbg,
    #[default]
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl FromStr for ColorOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rgb" => Ok(ColorOrder::Rgb),
            "rbg" => Ok(ColorOrder::Rbg),
            "grb" => Ok(ColorOrder::Grb),
            "gbr" => Ok(ColorOrder::Gbr),
            "brg" => Ok(ColorOrder::Brg),
            "bgr" => Ok(ColorOrder::Bgr),
            other => Err(format!(
                "Invalid color order: {other} (use rgb, rbg, grb, gbr, brg or bgr)"
            )),
        }
    }
}

impl fmt::Display for ColorOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColorOrder::Rgb => "rgb",
            ColorOrder::Rbg => "rbg",
            ColorOrder::Grb => "grb",
            ColorOrder::Gbr => "gbr",
            ColorOrder::Brg => "brg",
            ColorOrder::Bgr => "bgr",
        };
        f.write_str(s)
    }
}
