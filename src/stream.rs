//! Emission rate control for frame subscriptions.

use serde::{Deserialize, Serialize};

/// Emission rate for a frame subscription.
///
/// Frames flow through a latest-wins channel, so throttling samples the
/// most recent frame rather than queueing stale ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamRate {
    /// Every frame the board pushes (100 Hz).
    Native,

    /// At most this many frames per second.
    /// Requests at or above the source rate collapse to `Native`.
    Max(u32),
}

impl StreamRate {
    /// Normalize against the source frequency.
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            StreamRate::Native => StreamRate::Native,
            // A zero cap is meaningless; treat it as uncapped.
            StreamRate::Max(0) => StreamRate::Native,
            StreamRate::Max(hz) if f64::from(hz) >= source_hz => StreamRate::Native,
            StreamRate::Max(hz) => StreamRate::Max(hz),
        }
    }

    /// Minimum spacing between emissions, if a cap applies.
    pub fn throttle_interval(self, source_hz: f64) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            StreamRate::Native => None,
            StreamRate::Max(hz) => Some(std::time::Duration::from_secs_f64(1.0 / f64::from(hz))),
        }
    }
}
