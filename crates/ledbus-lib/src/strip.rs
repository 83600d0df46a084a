//! LED strip hardware — trait + backends.
//!
//! The core only ever talks to [`LedStrip`]; the real WS281x driver lives
//! behind the `ws281x` cargo feature so everything else builds and tests
//! on hosts without the hardware.

use std::fmt;

use crate::color::Rgb;

// ── Error type ──

/// Strip backend errors.
#[derive(Debug)]
pub enum StripError {
    /// The driver could not be brought up (wrong pin, missing permissions,
    /// or the binary was built without a hardware backend).
    InitFailed(String),
    /// A pixel or flush write failed.
    WriteFailed(String),
    /// Pixel index beyond the strip length.
    OutOfRange { index: usize, count: usize },
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripError::InitFailed(e) => write!(f, "Strip init failed: {e}"),
            StripError::WriteFailed(e) => write!(f, "Strip write failed: {e}"),
            StripError::OutOfRange { index, count } => {
                write!(f, "Pixel index {index} out of range (strip has {count})")
            }
        }
    }
}

impl std::error::Error for StripError {}

pub type Result<T> = std::result::Result<T, StripError>;

// ── Trait ──

/// The hardware handle the core renders onto.
///
/// `set_brightness` and `set_pixel` stage values in the driver's buffer;
/// nothing becomes visible until `show` commits the frame atomically.
pub trait LedStrip {
    fn pixel_count(&self) -> usize;
    /// Uniform brightness in `[0.0, 1.0]`, applied to the whole strip.
    fn set_brightness(&mut self, value: f32) -> Result<()>;
    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<()>;
    /// Flush the staged buffer to the hardware as one visible frame.
    fn show(&mut self) -> Result<()>;
}

// ── Mock strip for testing ──

/// In-memory mock strip for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;

    /// In-memory strip. Records staged pixels, brightness values, and
    /// every frame committed by `show()`, with injectable failures.
    #[derive(Debug)]
    pub struct MockStrip {
        count: usize,
        /// The staged (uncommitted) pixel buffer.
        pub pixels: Vec<Rgb>,
        /// The staged brightness.
        pub brightness: f32,
        /// Every brightness value ever staged, in order.
        pub brightness_history: Vec<f32>,
        /// Every frame committed by `show()`, in order.
        pub frames: Vec<Vec<Rgb>>,
        /// If true, `set_pixel` returns an error.
        pub fail_set_pixel: bool,
        /// If true, `show` returns an error.
        pub fail_show: bool,
    }

    impl MockStrip {
        pub fn new(count: usize) -> Self {
            MockStrip {
                count,
                pixels: vec![Rgb::BLACK; count],
                brightness: 0.0,
                brightness_history: Vec::new(),
                frames: Vec::new(),
                fail_set_pixel: false,
                fail_show: false,
            }
        }

        /// The most recently committed frame, if any.
        pub fn last_frame(&self) -> Option<&[Rgb]> {
            self.frames.last().map(Vec::as_slice)
        }
    }

    impl LedStrip for MockStrip {
        fn pixel_count(&self) -> usize {
            self.count
        }

        fn set_brightness(&mut self, value: f32) -> Result<()> {
            self.brightness = value;
            self.brightness_history.push(value);
            Ok(())
        }

        fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<()> {
            if self.fail_set_pixel {
                return Err(StripError::WriteFailed(
                    "mock: set_pixel failure injected".into(),
                ));
            }
            if index >= self.count {
                return Err(StripError::OutOfRange {
                    index,
                    count: self.count,
                });
            }
            self.pixels[index] = color;
            Ok(())
        }

        fn show(&mut self) -> Result<()> {
            if self.fail_show {
                return Err(StripError::WriteFailed("mock: show failure injected".into()));
            }
            self.frames.push(self.pixels.clone());
            Ok(())
        }
    }
}

// ── WS281x backend ──

/// Real WS281x strip driver (Raspberry Pi PWM/DMA via `rs_ws281x`).
#[cfg(feature = "ws281x")]
pub mod ws281x {
    use rs_ws281x::{ChannelBuilder, Controller, ControllerBuilder, StripType};

    use super::{LedStrip, Result, StripError};
    use crate::color::{ColorOrder, Rgb};

    pub struct Ws281xStrip {
        controller: Controller,
        count: usize,
    }

    impl Ws281xStrip {
        /// Bring up the driver on channel 0.
        pub fn open(pin: u8, dma: u8, count: usize, order: ColorOrder) -> Result<Self> {
            let controller = ControllerBuilder::new()
                .freq(800_000)
                .dma(i32::from(dma))
                .channel(
                    0,
                    ChannelBuilder::new()
                        .pin(i32::from(pin))
                        .count(count as i32)
                        .strip_type(strip_type(order))
                        .brightness(255)
                        .build(),
                )
                .build()
                .map_err(|e| StripError::InitFailed(e.to_string()))?;
            Ok(Ws281xStrip { controller, count })
        }
    }

    /// Channel ordering is handled by the driver's strip type.
    fn strip_type(order: ColorOrder) -> StripType {
        match order {
            ColorOrder::Rgb => StripType::Ws2811Rgb,
            ColorOrder::Rbg => StripType::Ws2811Rbg,
            ColorOrder::Grb => StripType::Ws2811Grb,
            ColorOrder::Gbr => StripType::Ws2811Gbr,
            ColorOrder::Brg => StripType::Ws2811Brg,
            ColorOrder::Bgr => StripType::Ws2811Bgr,
        }
    }

    impl LedStrip for Ws281xStrip {
        fn pixel_count(&self) -> usize {
            self.count
        }

        fn set_brightness(&mut self, value: f32) -> Result<()> {
            let scaled = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            self.controller.set_brightness(0, scaled);
            Ok(())
        }

        fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<()> {
            if index >= self.count {
                return Err(StripError::OutOfRange {
                    index,
                    count: self.count,
                });
            }
            // Raw driver colors are [B, G, R, W].
            self.controller.leds_mut(0)[index] = [color.b, color.g, color.r, 0];
            Ok(())
        }

        fn show(&mut self) -> Result<()> {
            self.controller
                .render()
                .map_err(|e| StripError::WriteFailed(e.to_string()))
        }
    }
}
