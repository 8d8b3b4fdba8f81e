//! Command function ids and the 4-byte message header.
//!
//! Every packet in either direction starts with the same header layout
//! (little-endian):
//!
//! | offset | field           | type  |
//! |--------|-----------------|-------|
//! | 0      | `packet_length` | `u16` |
//! | 2      | `function_id`   | `u8`  |
//! | 3      | `error_code`    | `u8`  |
//!
//! `packet_length` counts the whole packet including the header. Outbound
//! commands always carry `error_code = 0`; the board sets it in a reply
//! header to reject an unsupported function id.

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, Result};

/// Size of the message header in bytes.
pub const COMMAND_HEADER_SIZE: usize = 4;

/// Numeric function ids accepted by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FunctionId {
    GetStatus = 0,
    GetSystemInfo = 1,
    GetFtSensorData = 2,
    GetEncoderSensorData = 3,
    GetAllSensorData = 4,
    GetAllSensorDataMultiple = 5,
    StartAcquisitionStream = 6,
    StopAcquisitionStream = 7,
    ResetAdc = 8,
    CheckAdc = 9,
    SetAdcConversionMode = 10,
    SetAdcDataRate = 11,
}

impl FunctionId {
    /// Wire encoding of this function id.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire byte, if it names a known function.
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(FunctionId::GetStatus),
            1 => Some(FunctionId::GetSystemInfo),
            2 => Some(FunctionId::GetFtSensorData),
            3 => Some(FunctionId::GetEncoderSensorData),
            4 => Some(FunctionId::GetAllSensorData),
            5 => Some(FunctionId::GetAllSensorDataMultiple),
            6 => Some(FunctionId::StartAcquisitionStream),
            7 => Some(FunctionId::StopAcquisitionStream),
            8 => Some(FunctionId::ResetAdc),
            9 => Some(FunctionId::CheckAdc),
            10 => Some(FunctionId::SetAdcConversionMode),
            11 => Some(FunctionId::SetAdcDataRate),
            _ => None,
        }
    }
}

/// Fixed message header carried by every command and reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHeader {
    pub packet_length: u16,
    pub function_id: u8,
    pub error_code: u8,
}

impl CommandHeader {
    /// Header for a bare command with no payload.
    pub fn command(function: FunctionId) -> Self {
        Self {
            packet_length: COMMAND_HEADER_SIZE as u16,
            function_id: function.code(),
            error_code: 0,
        }
    }

    /// Header for a command followed by `payload_len` payload bytes.
    pub fn with_payload(function: FunctionId, payload_len: u16) -> Self {
        Self {
            packet_length: COMMAND_HEADER_SIZE as u16 + payload_len,
            function_id: function.code(),
            error_code: 0,
        }
    }

    /// Serialize to the 4-byte wire form.
    pub fn encode(&self) -> [u8; COMMAND_HEADER_SIZE] {
        let len = self.packet_length.to_le_bytes();
        [len[0], len[1], self.function_id, self.error_code]
    }

    /// Parse a header from its 4-byte wire form.
    pub fn decode(bytes: [u8; COMMAND_HEADER_SIZE]) -> Self {
        Self {
            packet_length: u16::from_le_bytes([bytes[0], bytes[1]]),
            function_id: bytes[2],
            error_code: bytes[3],
        }
    }

    /// The known function this header names, if any.
    pub fn function(&self) -> Option<FunctionId> {
        FunctionId::from_u8(self.function_id)
    }

    /// Number of body bytes that follow this header.
    pub fn body_len(&self) -> usize {
        (self.packet_length as usize).saturating_sub(COMMAND_HEADER_SIZE)
    }

    /// Whether the board rejected the request.
    pub fn is_rejection(&self) -> bool {
        self.error_code != 0
    }

    /// Validate that this reply header answers `expected`.
    pub fn expect_reply(&self, expected: FunctionId) -> Result<()> {
        if self.is_rejection() {
            return Err(DeviceError::Rejected {
                function_id: self.function_id,
                code: self.error_code,
            });
        }
        if self.function_id != expected.code() {
            return Err(DeviceError::UnexpectedReply { expected, received: self.function_id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_ids_match_wire_codes() {
        assert_eq!(FunctionId::GetStatus.code(), 0);
        assert_eq!(FunctionId::GetAllSensorData.code(), 4);
        assert_eq!(FunctionId::StartAcquisitionStream.code(), 6);
        assert_eq!(FunctionId::StopAcquisitionStream.code(), 7);
        assert_eq!(FunctionId::SetAdcDataRate.code(), 11);
    }

    #[test]
    fn function_id_byte_roundtrip() {
        for code in 0u8..=11 {
            let fid = FunctionId::from_u8(code).expect("known function id");
            assert_eq!(fid.code(), code);
        }
        assert_eq!(FunctionId::from_u8(12), None);
        assert_eq!(FunctionId::from_u8(255), None);
    }

    #[test]
    fn bare_command_header_wire_form() {
        let header = CommandHeader::command(FunctionId::StartAcquisitionStream);
        assert_eq!(header.encode(), [4, 0, 6, 0]);
        assert_eq!(header.body_len(), 0);
        assert!(!header.is_rejection());
    }

    #[test]
    fn payload_header_counts_whole_packet() {
        let header = CommandHeader::with_payload(FunctionId::SetAdcDataRate, 1);
        assert_eq!(header.packet_length, 5);
        assert_eq!(header.encode(), [5, 0, 11, 0]);
        assert_eq!(header.body_len(), 1);
    }

    #[test]
    fn header_codec_roundtrip() {
        let header = CommandHeader { packet_length: 44, function_id: 4, error_code: 0 };
        assert_eq!(CommandHeader::decode(header.encode()), header);
        assert_eq!(header.function(), Some(FunctionId::GetAllSensorData));
        assert_eq!(header.body_len(), 40);
    }

    #[test]
    fn rejection_header_is_detected() {
        let header = CommandHeader::decode([4, 0, 12, 1]);
        assert!(header.is_rejection());
        assert_eq!(header.function(), None);

        let err = header.expect_reply(FunctionId::GetStatus).unwrap_err();
        assert!(matches!(err, crate::DeviceError::Rejected { function_id: 12, code: 1 }));
    }

    #[test]
    fn mismatched_reply_is_rejected() {
        let header = CommandHeader::command(FunctionId::GetSystemInfo);
        let err = header.expect_reply(FunctionId::GetStatus).unwrap_err();
        assert!(matches!(err, crate::DeviceError::UnexpectedReply { received: 1, .. }));
    }
}
