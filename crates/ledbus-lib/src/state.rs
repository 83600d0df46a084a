//! Strip state — storage for the strip's remembered and visible state.
//!
//! `StripState` is plain storage: read accessors plus a single wholesale
//! mutation entry point. All merging of partial updates happens in
//! [`crate::reconcile`]; nothing else may mutate individual fields.

use serde::Serialize;

use crate::color::Rgb;

/// The in-memory state of the LED strip.
///
/// `color` is the *remembered* color — what every pixel shows while the
/// strip is on, and what the next turn-on reuses. `rendered` is what the
/// pixel buffer actually holds right now; it is black while the strip is
/// off, except after a color-only update arrived while off (see
/// [`crate::reconcile::reconcile`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripState {
    pixel_count: usize,
    pub(crate) brightness: f32,
    pub(crate) color: Rgb,
    pub(crate) rendered: Rgb,
    pub(crate) illuminated: bool,
}

impl StripState {
    /// Startup state: remembered color white, brightness 0.5, all dark.
    pub fn new(pixel_count: usize) -> Self {
        Self::with_defaults(pixel_count, Rgb::WHITE, 0.5)
    }

    /// Startup state with configured defaults. Brightness is clamped to
    /// `[0.0, 1.0]`; the strip always starts not illuminated.
    pub fn with_defaults(pixel_count: usize, color: Rgb, brightness: f32) -> Self {
        StripState {
            pixel_count,
            brightness: brightness.clamp(0.0, 1.0),
            color,
            rendered: Rgb::BLACK,
            illuminated: false,
        }
    }

    /// Number of pixels. Fixed for the process lifetime.
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Uniform brightness in `[0.0, 1.0]`.
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// The remembered color, reused on the next turn-on.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// What the pixel buffer holds right now.
    pub fn rendered(&self) -> Rgb {
        self.rendered
    }

    /// Whether pixels currently show the remembered color.
    pub fn illuminated(&self) -> bool {
        self.illuminated
    }

    /// Overwrite the mutable fields with a fully-resolved new state.
    ///
    /// The single mutation entry point. `pixel_count` is immutable and
    /// kept from `self`.
    pub fn apply(&mut self, resolved: StripState) {
        self.brightness = resolved.brightness;
        self.color = resolved.color;
        self.rendered = resolved.rendered;
        self.illuminated = resolved.illuminated;
    }
}
