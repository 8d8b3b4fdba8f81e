//! Typed reply bodies for request/reply commands.
//!
//! Replies arrive as a [`CommandHeader`](super::command::CommandHeader)
//! followed by `packet_length - 4` body bytes. String fields in the system
//! info reply are fixed-width ASCII, NUL-padded by the firmware.

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Result};
use crate::protocol::frame::read_f32_le;

/// Body length of a `GetStatus` reply.
pub const STATUS_BODY_LEN: usize = 1;

/// Body length of a `GetSystemInfo` reply.
pub const SYSTEM_INFO_BODY_LEN: usize = FW_VERSION_LEN + BOARD_ID_LEN + IP_ADDR_LEN + MAC_ADDR_LEN;

const FW_VERSION_LEN: usize = 5;
const BOARD_ID_LEN: usize = 19;
const IP_ADDR_LEN: usize = 14;
const MAC_ADDR_LEN: usize = 20;

/// Body length of a `GetFtSensorData` reply: 6 × f32.
pub const FT_BODY_LEN: usize = 24;

/// Body length of a `GetEncoderSensorData` reply: 3 × f32.
pub const ENCODER_BODY_LEN: usize = 12;

/// Connection state reported by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BoardState {
    /// Listening for a client (status LED blinking).
    WaitForConnection = 0,
    /// A client is connected (status LED solid).
    Connected = 1,
}

impl BoardState {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(BoardState::WaitForConnection),
            1 => Some(BoardState::Connected),
            _ => None,
        }
    }
}

/// `GetStatus` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub state: BoardState,
}

impl SystemStatus {
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.len() != STATUS_BODY_LEN {
            return Err(DeviceError::reply_error(
                "status reply",
                format!("expected {STATUS_BODY_LEN} body byte, got {}", body.len()),
            ));
        }
        match BoardState::from_u8(body[0]) {
            Some(state) => Ok(Self { state }),
            None => Err(DeviceError::reply_error(
                "status reply",
                format!("unknown board state {}", body[0]),
            )),
        }
    }
}

/// `GetSystemInfo` reply: firmware identity and network addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub fw_version: String,
    pub board_id: String,
    pub ip_addr: String,
    pub mac_addr: String,
}

impl SystemInfo {
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.len() != SYSTEM_INFO_BODY_LEN {
            return Err(DeviceError::reply_error(
                "system info reply",
                format!("expected {SYSTEM_INFO_BODY_LEN} body bytes, got {}", body.len()),
            ));
        }
        let (fw, rest) = body.split_at(FW_VERSION_LEN);
        let (id, rest) = rest.split_at(BOARD_ID_LEN);
        let (ip, mac) = rest.split_at(IP_ADDR_LEN);
        Ok(Self {
            fw_version: fixed_ascii(fw),
            board_id: fixed_ascii(id),
            ip_addr: fixed_ascii(ip),
            mac_addr: fixed_ascii(mac),
        })
    }
}

/// `GetFtSensorData` reply: a single force/torque sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FtReading {
    pub force: [f32; 3],
    pub torque: [f32; 3],
}

impl FtReading {
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.len() != FT_BODY_LEN {
            return Err(DeviceError::reply_error(
                "force/torque reply",
                format!("expected {FT_BODY_LEN} body bytes, got {}", body.len()),
            ));
        }
        Ok(Self {
            force: [read_f32_le(body, 0)?, read_f32_le(body, 4)?, read_f32_le(body, 8)?],
            torque: [read_f32_le(body, 12)?, read_f32_le(body, 16)?, read_f32_le(body, 20)?],
        })
    }
}

/// `GetEncoderSensorData` reply: a single encoder position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncoderReading {
    pub position: [f32; 3],
}

impl EncoderReading {
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.len() != ENCODER_BODY_LEN {
            return Err(DeviceError::reply_error(
                "encoder reply",
                format!("expected {ENCODER_BODY_LEN} body bytes, got {}", body.len()),
            ));
        }
        Ok(Self {
            position: [read_f32_le(body, 0)?, read_f32_le(body, 4)?, read_f32_le(body, 8)?],
        })
    }
}

/// Extract a NUL-padded fixed-width ASCII field.
fn fixed_ascii(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}
