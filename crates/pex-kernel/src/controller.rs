//! Emission bookkeeping.
//!
//! The controller decides when particles are spawned. Emission is
//! fractional: elapsed time accumulates in the emit counter and one particle
//! is spawned per full emission interval, so a long frame can spawn several
//! particles and a short one none.

use tracing::{debug, trace};

use crate::config::EmitterConfig;

/// Emission state machine (Inactive / Active) with its timers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmissionController {
    /// Whether new particles are being emitted.
    active: bool,
    /// Seconds since emission started.
    elapsed: f32,
    /// Unspent emission time.
    emit_counter: f32,
}

impl EmissionController {
    /// Creates an inactive controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) emission, resetting the timers.
    pub fn start(&mut self) {
        debug!("Emitter started");
        self.active = true;
        self.elapsed = 0.0;
        self.emit_counter = 0.0;
    }

    /// Stops emission. Live particles are unaffected.
    pub fn stop(&mut self) {
        if self.active {
            debug!("Emitter stopped after {:.3}s", self.elapsed);
        }
        self.active = false;
    }

    /// Returns true while emitting.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds since emission started.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Unspent emission time.
    #[must_use]
    pub fn emit_counter(&self) -> f32 {
        self.emit_counter
    }

    /// Advances the timers by `delta` and spawns what is due.
    ///
    /// `spawn` is called once per due particle and returns false when the
    /// pool is saturated; the remaining demand then stays in the counter.
    /// Returns the number of particles spawned.
    pub fn tick(
        &mut self,
        delta: f32,
        config: &EmitterConfig,
        mut spawn: impl FnMut() -> bool,
    ) -> usize {
        if !self.active {
            return 0;
        }

        let mut spawned = 0;
        if let Some(interval) = config.emission_interval() {
            self.emit_counter += delta;
            while self.emit_counter > interval {
                if !spawn() {
                    trace!("Spawn demand deferred, counter {:.3}", self.emit_counter);
                    break;
                }
                self.emit_counter -= interval;
                spawned += 1;
            }
        }

        self.elapsed += delta;
        if let Some(duration) = config.duration {
            if self.elapsed >= duration {
                debug!("Emission duration {duration}s expired");
                self.active = false;
            }
        }

        spawned
    }
}
