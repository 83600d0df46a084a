//! Strip controller — the reconcile+commit pipeline under one lock.
//!
//! One `Mutex` owns both the [`StripState`] and the hardware handle, so a
//! full reconcile-then-commit sequence for one message can never interleave
//! its pixel writes with another's. Messages arriving concurrently are
//! serialized, never dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::message::PartialUpdate;
use crate::reconcile::reconcile;
use crate::state::StripState;
use crate::strip::{self, LedStrip};

struct Inner<S> {
    state: StripState,
    strip: S,
}

/// Owns the strip state and hardware handle behind one lock.
pub struct StripController<S: LedStrip> {
    inner: Mutex<Inner<S>>,
}

impl<S: LedStrip> StripController<S> {
    pub fn new(strip: S, state: StripState) -> Self {
        StripController {
            inner: Mutex::new(Inner { state, strip }),
        }
    }

    /// Decode, reconcile, and commit one bus payload.
    ///
    /// The bus message handler: errors are logged and the message dropped;
    /// nothing propagates to the delivery loop.
    pub fn handle_payload(&self, payload: &[u8]) {
        let update = match PartialUpdate::from_payload(payload) {
            Ok(update) => update,
            Err(e) => {
                log::warn!("dropping message: {e}");
                return;
            }
        };
        match self.apply(&update) {
            Ok(state) => log::debug!(
                "applied update: illuminated={} brightness={:.2} color={}",
                state.illuminated(),
                state.brightness(),
                state.color()
            ),
            Err(e) => log::warn!("dropping message, hardware write failed: {e}"),
        }
    }

    /// Reconcile `update` against the current state and commit the result
    /// to the hardware, all inside the critical section.
    ///
    /// The stored state is only advanced after a successful commit, so a
    /// failed hardware write leaves the strip state unchanged.
    pub fn apply(&self, update: &PartialUpdate) -> strip::Result<StripState> {
        let mut inner = self.lock();
        let next = reconcile(&inner.state, update);
        commit(&mut inner.strip, &next)?;
        inner.state.apply(next.clone());
        Ok(next)
    }

    /// A copy of the current strip state.
    pub fn snapshot(&self) -> StripState {
        self.lock().state.clone()
    }

    /// Run `f` with the state and strip under the lock (tests, status output).
    pub fn inspect<R>(&self, f: impl FnOnce(&StripState, &S) -> R) -> R {
        let inner = self.lock();
        f(&inner.state, &inner.strip)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        // State is advanced only after a successful commit, so it is
        // consistent even if a commit panicked; a poisoned lock is safe to
        // recover.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write the resolved state to the strip and flush it as one frame.
fn commit<S: LedStrip>(strip: &mut S, state: &StripState) -> strip::Result<()> {
    strip.set_brightness(state.brightness())?;
    let count = state.pixel_count().min(strip.pixel_count());
    for index in 0..count {
        strip.set_pixel(index, state.rendered())?;
    }
    strip.show()
}
