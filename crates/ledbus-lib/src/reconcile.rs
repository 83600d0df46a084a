//! Update reconciliation — merges a partial update into the strip state.
//!
//! Pure decision logic, decoupled from hardware I/O so the merge policy is
//! testable on its own. The [`crate::controller`] runs `reconcile` and the
//! hardware commit under one lock.

use crate::color::Rgb;
use crate::message::PartialUpdate;
use crate::state::StripState;

/// Merge `update` into `current`, producing the state to commit.
///
/// Field policy:
/// - `color` replaces the remembered color.
/// - `brightness` replaces the brightness only when within `[0.0, 1.0]`;
///   out-of-range values are silently ignored, leaving the previous
///   brightness in place.
/// - `state: on` illuminates with the (possibly just updated) remembered
///   color; `state: off` blacks out the buffer but keeps the remembered
///   color for the next turn-on.
///
/// Quirk, kept intentionally: a color-only update (no `state` field) is
/// written into the pixel buffer even while the strip is off, so the
/// buffer then holds the new color although `illuminated` stays false.
/// Test suites and downstream automations observe this behavior; changing
/// it needs product sign-off.
pub fn reconcile(current: &StripState, update: &PartialUpdate) -> StripState {
    let mut next = current.clone();

    if let Some(color) = update.color {
        next.color = color;
    }

    if let Some(brightness) = update.brightness {
        if (0.0..=1.0).contains(&brightness) {
            next.brightness = brightness;
        } else {
            log::debug!("ignoring out-of-range brightness {brightness}");
        }
    }

    match update.state {
        Some(true) => {
            next.illuminated = true;
            next.rendered = next.color;
        }
        Some(false) => {
            next.illuminated = false;
            next.rendered = Rgb::BLACK;
        }
        None => {
            // Color changes always land in the pixel buffer, illuminated
            // or not (the quirk documented above). A brightness-only
            // update leaves the buffer untouched.
            if update.color.is_some() {
                next.rendered = next.color;
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_state(color: Rgb, brightness: f32) -> StripState {
        let mut state = StripState::with_defaults(10, color, brightness);
        state.illuminated = true;
        state.rendered = color;
        state
    }

    fn update() -> PartialUpdate {
        PartialUpdate::default()
    }

    // ── brightness ──

    #[test]
    fn brightness_only_changes_brightness_alone() {
        let current = on_state(Rgb::new(0, 255, 0), 0.5);
        let next = reconcile(
            &current,
            &PartialUpdate {
                brightness: Some(0.8),
                ..update()
            },
        );
        assert_eq!(next.brightness(), 0.8);
        assert_eq!(next.color(), current.color());
        assert_eq!(next.rendered(), current.rendered());
        assert_eq!(next.illuminated(), current.illuminated());
    }

    #[test]
    fn brightness_bounds_are_inclusive() {
        let current = StripState::new(10);
        for value in [0.0, 1.0] {
            let next = reconcile(
                &current,
                &PartialUpdate {
                    brightness: Some(value),
                    ..update()
                },
            );
            assert_eq!(next.brightness(), value);
        }
    }

    #[test]
    fn out_of_range_brightness_is_ignored() {
        let current = StripState::new(10);
        for value in [-0.1, 1.1, 42.0, f32::NAN] {
            let next = reconcile(
                &current,
                &PartialUpdate {
                    brightness: Some(value),
                    ..update()
                },
            );
            assert_eq!(next, current, "value {value} should leave state untouched");
        }
    }

    // ── state ──

    #[test]
    fn turn_on_renders_remembered_color() {
        let current = StripState::with_defaults(10, Rgb::new(0, 255, 0), 0.5);
        let next = reconcile(
            &current,
            &PartialUpdate {
                state: Some(true),
                ..update()
            },
        );
        assert!(next.illuminated());
        assert_eq!(next.rendered(), Rgb::new(0, 255, 0));
        assert_eq!(next.color(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn turn_off_preserves_remembered_color() {
        let current = on_state(Rgb::new(0, 255, 0), 0.5);
        let next = reconcile(
            &current,
            &PartialUpdate {
                state: Some(false),
                ..update()
            },
        );
        assert!(!next.illuminated());
        assert_eq!(next.rendered(), Rgb::BLACK);
        assert_eq!(next.color(), Rgb::new(0, 255, 0), "remembered color survives");
    }

    #[test]
    fn off_then_on_round_trips_color() {
        let start = on_state(Rgb::new(17, 34, 51), 0.5);
        let off = reconcile(
            &start,
            &PartialUpdate {
                state: Some(false),
                ..update()
            },
        );
        let on = reconcile(
            &off,
            &PartialUpdate {
                state: Some(true),
                ..update()
            },
        );
        assert_eq!(on.rendered(), Rgb::new(17, 34, 51));
    }

    // ── color ──

    #[test]
    fn color_with_turn_on_renders_new_color() {
        let current = StripState::new(10);
        let next = reconcile(
            &current,
            &PartialUpdate {
                state: Some(true),
                color: Some(Rgb::new(255, 0, 0)),
                ..update()
            },
        );
        assert!(next.illuminated());
        assert_eq!(next.rendered(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn color_with_turn_off_remembers_but_blacks_out() {
        let current = on_state(Rgb::WHITE, 0.5);
        let next = reconcile(
            &current,
            &PartialUpdate {
                state: Some(false),
                color: Some(Rgb::new(0, 255, 0)),
                ..update()
            },
        );
        assert!(!next.illuminated());
        assert_eq!(next.color(), Rgb::new(0, 255, 0));
        assert_eq!(next.rendered(), Rgb::BLACK);
    }

    #[test]
    fn color_while_on_updates_rendered() {
        let current = on_state(Rgb::WHITE, 0.5);
        let next = reconcile(
            &current,
            &PartialUpdate {
                color: Some(Rgb::new(0, 0, 255)),
                ..update()
            },
        );
        assert!(next.illuminated());
        assert_eq!(next.rendered(), Rgb::new(0, 0, 255));
    }

    #[test]
    fn color_while_off_lands_in_pixel_buffer() {
        // The preserved quirk: the buffer holds the new color although the
        // strip stays off.
        let current = StripState::new(10);
        assert!(!current.illuminated());
        let next = reconcile(
            &current,
            &PartialUpdate {
                color: Some(Rgb::new(0, 255, 0)),
                ..update()
            },
        );
        assert!(!next.illuminated());
        assert_eq!(next.rendered(), Rgb::new(0, 255, 0));
        assert_eq!(next.color(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn empty_update_is_identity() {
        let current = on_state(Rgb::new(1, 2, 3), 0.25);
        let next = reconcile(&current, &update());
        assert_eq!(next, current);
    }

    #[test]
    fn brightness_only_while_off_keeps_buffer() {
        // After the color-while-off quirk, a brightness update must not
        // reset the buffer to black.
        let current = StripState::new(10);
        let with_color = reconcile(
            &current,
            &PartialUpdate {
                color: Some(Rgb::new(0, 255, 0)),
                ..update()
            },
        );
        let next = reconcile(
            &with_color,
            &PartialUpdate {
                brightness: Some(0.3),
                ..update()
            },
        );
        assert_eq!(next.rendered(), Rgb::new(0, 255, 0));
        assert!(!next.illuminated());
    }

    // ── end-to-end scenario ──

    #[test]
    fn full_scenario_white_on_brightness_green_off_on() {
        let state0 = StripState::new(10);

        // {state: on} → all white, on
        let state1 = reconcile(
            &state0,
            &PartialUpdate {
                state: Some(true),
                ..update()
            },
        );
        assert!(state1.illuminated());
        assert_eq!(state1.rendered(), Rgb::WHITE);

        // {brightness: 0.8} → brightness changes, pixels stay white/on
        let state2 = reconcile(
            &state1,
            &PartialUpdate {
                brightness: Some(0.8),
                ..update()
            },
        );
        assert_eq!(state2.brightness(), 0.8);
        assert_eq!(state2.rendered(), Rgb::WHITE);
        assert!(state2.illuminated());

        // {color: green, state: off} → off, remembered green, black pixels
        let state3 = reconcile(
            &state2,
            &PartialUpdate {
                state: Some(false),
                color: Some(Rgb::new(0, 255, 0)),
                ..update()
            },
        );
        assert!(!state3.illuminated());
        assert_eq!(state3.color(), Rgb::new(0, 255, 0));
        assert_eq!(state3.rendered(), Rgb::BLACK);

        // {state: on} → all green
        let state4 = reconcile(
            &state3,
            &PartialUpdate {
                state: Some(true),
                ..update()
            },
        );
        assert!(state4.illuminated());
        assert_eq!(state4.rendered(), Rgb::new(0, 255, 0));
    }
}
