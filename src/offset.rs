//! Zero-offset baseline for sensor channels.
//!
//! Zeroing captures the 9 channels of the most recent frame and subtracts
//! them from every subsequent frame, so readings are reported relative to
//! the moment of capture.

use serde::{Deserialize, Serialize};

use crate::protocol::frame::{CHANNEL_COUNT, SensorFrame};

/// Per-channel baseline subtracted from incoming frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelOffset {
    channels: [f32; CHANNEL_COUNT],
}

impl ChannelOffset {
    /// The identity baseline: frames pass through unadjusted.
    pub const ZERO: Self = Self { channels: [0.0; CHANNEL_COUNT] };

    /// Snapshot a frame's channels as the new baseline.
    pub fn capture(frame: &SensorFrame) -> Self {
        Self { channels: frame.channels() }
    }

    /// Baseline values in wire channel order.
    pub fn channels(&self) -> &[f32; CHANNEL_COUNT] {
        &self.channels
    }

    /// Subtract this baseline from a frame.
    pub fn adjust(&self, frame: &SensorFrame) -> AdjustedFrame {
        let raw = frame.channels();
        AdjustedFrame {
            timestamp: frame.timestamp,
            channels: std::array::from_fn(|i| raw[i] - self.channels[i]),
        }
    }
}

/// A sensor frame with the zero baseline applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedFrame {
    /// Microseconds since the acquisition stream started.
    pub timestamp: u32,
    /// Adjusted channels in wire order: force, torque, encoder.
    pub channels: [f32; CHANNEL_COUNT],
}

impl AdjustedFrame {
    pub fn force(&self) -> [f32; 3] {
        [self.channels[0], self.channels[1], self.channels[2]]
    }

    pub fn torque(&self) -> [f32; 3] {
        [self.channels[3], self.channels[4], self.channels[5]]
    }

    pub fn encoder(&self) -> [f32; 3] {
        [self.channels[6], self.channels[7], self.channels[8]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> SensorFrame {
        SensorFrame {
            timestamp: 100,
            force: [1.0, 2.0, 3.0],
            torque: [4.0, 5.0, 6.0],
            encoder: [7.0, 8.0, 9.0],
        }
    }

    #[test]
    fn zero_baseline_is_identity() {
        let adjusted = ChannelOffset::ZERO.adjust(&sample_frame());
        assert_eq!(adjusted.timestamp, 100);
        assert_eq!(adjusted.channels, sample_frame().channels());
    }

    #[test]
    fn capture_then_adjust_same_frame_is_all_zero() {
        let frame = sample_frame();
        let offset = ChannelOffset::capture(&frame);
        let adjusted = offset.adjust(&frame);
        assert_eq!(adjusted.channels, [0.0; CHANNEL_COUNT]);
    }

    #[test]
    fn adjust_subtracts_per_channel() {
        let baseline = SensorFrame {
            timestamp: 0,
            force: [0.5, 0.5, 0.5],
            torque: [1.0, 1.0, 1.0],
            encoder: [2.0, 2.0, 2.0],
        };
        let offset = ChannelOffset::capture(&baseline);
        let adjusted = offset.adjust(&sample_frame());
        assert_eq!(adjusted.force(), [0.5, 1.5, 2.5]);
        assert_eq!(adjusted.torque(), [3.0, 4.0, 5.0]);
        assert_eq!(adjusted.encoder(), [5.0, 6.0, 7.0]);
    }

    #[test]
    fn default_offset_is_zero() {
        assert_eq!(ChannelOffset::default(), ChannelOffset::ZERO);
    }
}
