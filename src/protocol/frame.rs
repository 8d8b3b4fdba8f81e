//! Sensor frame codec.
//!
//! The board pushes one fixed 40-byte record per acquisition tick
//! (little-endian):
//!
//! | offset | field       | type       |
//! |--------|-------------|------------|
//! | 0      | `timestamp` | `u32` (µs since stream start) |
//! | 4      | force x/y/z | `3 × f32`  |
//! | 16     | torque x/y/z| `3 × f32`  |
//! | 28     | encoder x/y/z | `3 × f32` |
//!
//! The same record is the body of a `GetAllSensorData` reply. Decoding and
//! re-encoding a frame reproduces the original bytes exactly, including
//! non-finite float bit patterns.

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Result};

/// Size of one sensor frame on the wire.
pub const FRAME_SIZE: usize = 40;

/// Number of numeric channels in a frame: 6 force/torque + 3 encoder.
///
/// The offset baseline carries exactly the same channels in the same order.
pub const CHANNEL_COUNT: usize = 9;

/// One decoded sensor record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Microseconds since the acquisition stream started.
    pub timestamp: u32,
    /// Force readings, x/y/z.
    pub force: [f32; 3],
    /// Torque readings, x/y/z.
    pub torque: [f32; 3],
    /// Linear encoder positions, x/y/z.
    pub encoder: [f32; 3],
}

impl SensorFrame {
    /// Decode a frame from its exact wire form.
    pub fn decode(bytes: &[u8; FRAME_SIZE]) -> Self {
        let timestamp = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let mut channels = [0f32; CHANNEL_COUNT];
        for (i, channel) in channels.iter_mut().enumerate() {
            let at = 4 + i * 4;
            *channel = f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        }
        Self::from_channels(timestamp, channels)
    }

    /// Decode a frame from a reply body, validating its length.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.len() != FRAME_SIZE {
            return Err(DeviceError::reply_error(
                "sensor frame",
                format!("expected {FRAME_SIZE} bytes, got {}", body.len()),
            ));
        }
        let mut bytes = [0u8; FRAME_SIZE];
        bytes.copy_from_slice(body);
        Ok(Self::decode(&bytes))
    }

    /// Serialize to the 40-byte wire form.
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[0..4].copy_from_slice(&self.timestamp.to_le_bytes());
        for (i, channel) in self.channels().iter().enumerate() {
            let at = 4 + i * 4;
            bytes[at..at + 4].copy_from_slice(&channel.to_le_bytes());
        }
        bytes
    }

    /// All 9 channels flattened in wire order: force, torque, encoder.
    pub fn channels(&self) -> [f32; CHANNEL_COUNT] {
        [
            self.force[0],
            self.force[1],
            self.force[2],
            self.torque[0],
            self.torque[1],
            self.torque[2],
            self.encoder[0],
            self.encoder[1],
            self.encoder[2],
        ]
    }

    fn from_channels(timestamp: u32, channels: [f32; CHANNEL_COUNT]) -> Self {
        Self {
            timestamp,
            force: [channels[0], channels[1], channels[2]],
            torque: [channels[3], channels[4], channels[5]],
            encoder: [channels[6], channels[7], channels[8]],
        }
    }
}

/// Read one little-endian `f32` out of a reply body.
pub(crate) fn read_f32_le(bytes: &[u8], offset: usize) -> Result<f32> {
    let Some(slice) = bytes.get(offset..offset + 4) else {
        return Err(DeviceError::reply_error(
            "float field",
            format!("read of 4 bytes at offset {offset} past end of {}-byte body", bytes.len()),
        ));
    };
    let mut word = [0u8; 4];
    word.copy_from_slice(slice);
    Ok(f32::from_le_bytes(word))
}
