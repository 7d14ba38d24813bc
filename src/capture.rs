//! Auto-capture debounce.
//!
//! The only component with cross-tick state: it arms on the first fully
//! passing tick, fires once the passing state has held for the configured
//! delay, and disarms the moment the state is lost. The enabled flag is
//! atomic so a UI thread may toggle it mid-session; the value is read once
//! per tick, so a toggle takes effect on the next evaluation rather than
//! mid-tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Idle/armed debounce state machine for automatic capture.
pub struct AutoCaptureController {
    enabled: Arc<AtomicBool>,
    delay: Duration,
    armed_since: Option<Duration>,
    delivered: bool,
}

impl AutoCaptureController {
    /// Create a controller with the given debounce delay, auto-capture
    /// initially enabled
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            delay,
            armed_since: None,
            delivered: false,
        }
    }

    /// Shared handle to the enabled flag, safe to toggle from another
    /// thread
    #[must_use]
    pub fn enabled_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.enabled)
    }

    /// Enable or disable automatic capture. Disabling cancels a pending
    /// capture before it fires.
    pub fn set_auto_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// True once a capture (automatic or forced) has been delivered
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.delivered
    }

    /// Advance the debounce by one tick.
    ///
    /// Returns `true` exactly once per session: on the first tick where the
    /// full-pass state has held for the whole delay with auto-capture
    /// enabled. Losing the full pass, or disabling auto-capture, disarms
    /// and the debounce restarts from scratch on the next full pass.
    pub fn tick(&mut self, full_pass: bool, now: Duration) -> bool {
        if !full_pass || !self.enabled.load(Ordering::Acquire) {
            self.armed_since = None;
            return false;
        }

        let armed = *self.armed_since.get_or_insert(now);
        if !self.delivered && now.saturating_sub(armed) >= self.delay {
            self.delivered = true;
            log::info!("Auto-capture fired after {:.1}s of stable alignment", self.delay.as_secs_f64());
            return true;
        }
        false
    }

    /// Deliver a forced capture, bypassing the debounce.
    ///
    /// Returns `true` when the capture may proceed; a second call is a
    /// no-op because the session is already marked captured.
    pub fn force(&mut self) -> bool {
        if self.delivered {
            return false;
        }
        self.delivered = true;
        self.armed_since = None;
        true
    }

    /// Clear all debounce state for a fresh session
    pub fn reset(&mut self) {
        self.armed_since = None;
        self.delivered = false;
    }
}
