//! # FCP Protocol Constants and Types
//!
//! Core protocol definitions for the FOSSASAT-1 communication protocol (FCP).
//!
//! Frame structure:
//! ```text
//! [callsign: N bytes][function ID: 1][optional data length: 1][optional data: 0..255]
//! ```
//! The length byte and the data are only present when the frame carries optional data.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Maximum on-air frame size (SX127x / SX126x FIFO length)
pub const FCP_MAX_FRAME_LENGTH: usize = 255;

/// Maximum optional data length representable by the length byte
pub const FCP_MAX_OPTIONAL_DATA_LENGTH: usize = u8::MAX as usize;

/// Default satellite callsign
pub const FCP_DEFAULT_CALLSIGN: &str = "FOSSASAT-1";

/// Ping the satellite
pub const CMD_PING: u8 = 0x00;

/// Ask the satellite to retransmit the optional data
pub const CMD_RETRANSMIT: u8 = 0x01;

/// Retransmit with custom modem settings
pub const CMD_RETRANSMIT_CUSTOM: u8 = 0x02;

/// Request a system info frame
pub const CMD_TRANSMIT_SYSTEM_INFO: u8 = 0x03;

/// Request SNR/RSSI of the last packet the satellite received
pub const CMD_GET_LAST_PACKET_INFO: u8 = 0x04;

pub const RESP_PONG: u8 = 0x10;
pub const RESP_REPEATED_MESSAGE: u8 = 0x11;
pub const RESP_REPEATED_MESSAGE_CUSTOM: u8 = 0x12;
pub const RESP_SYSTEM_INFO: u8 = 0x13;
pub const RESP_LAST_PACKET_INFO: u8 = 0x14;

/// Ground to satellite function IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Ping,
    Retransmit,
    RetransmitCustom,
    TransmitSystemInfo,
    GetLastPacketInfo,
}

impl Command {
    /// Function ID byte for this command
    pub fn function_id(self) -> u8 {
        match self {
            Command::Ping => CMD_PING,
            Command::Retransmit => CMD_RETRANSMIT,
            Command::RetransmitCustom => CMD_RETRANSMIT_CUSTOM,
            Command::TransmitSystemInfo => CMD_TRANSMIT_SYSTEM_INFO,
            Command::GetLastPacketInfo => CMD_GET_LAST_PACKET_INFO,
        }
    }

    /// Parse a command byte, `None` if it is not in the command namespace
    pub fn from_function_id(id: u8) -> Option<Self> {
        match id {
            CMD_PING => Some(Command::Ping),
            CMD_RETRANSMIT => Some(Command::Retransmit),
            CMD_RETRANSMIT_CUSTOM => Some(Command::RetransmitCustom),
            CMD_TRANSMIT_SYSTEM_INFO => Some(Command::TransmitSystemInfo),
            CMD_GET_LAST_PACKET_INFO => Some(Command::GetLastPacketInfo),
            _ => None,
        }
    }
}

/// Satellite to ground function IDs
///
/// Total over `u8`: anything outside the known set maps to `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseId {
    Pong,
    RepeatedMessage,
    RepeatedMessageCustom,
    SystemInfo,
    LastPacketInfo,
    Unrecognized(u8),
}

impl ResponseId {
    pub fn from_function_id(id: u8) -> Self {
        match id {
            RESP_PONG => ResponseId::Pong,
            RESP_REPEATED_MESSAGE => ResponseId::RepeatedMessage,
            RESP_REPEATED_MESSAGE_CUSTOM => ResponseId::RepeatedMessageCustom,
            RESP_SYSTEM_INFO => ResponseId::SystemInfo,
            RESP_LAST_PACKET_INFO => ResponseId::LastPacketInfo,
            other => ResponseId::Unrecognized(other),
        }
    }

    pub fn function_id(self) -> u8 {
        match self {
            ResponseId::Pong => RESP_PONG,
            ResponseId::RepeatedMessage => RESP_REPEATED_MESSAGE,
            ResponseId::RepeatedMessageCustom => RESP_REPEATED_MESSAGE_CUSTOM,
            ResponseId::SystemInfo => RESP_SYSTEM_INFO,
            ResponseId::LastPacketInfo => RESP_LAST_PACKET_INFO,
            ResponseId::Unrecognized(raw) => raw,
        }
    }
}

/// Satellite callsign used to address and filter frames
///
/// Always non-empty printable ASCII, short enough to leave room for a header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Callsign(String);

impl Callsign {
    /// Validate and wrap a callsign
    ///
    /// # Errors
    ///
    /// Returns `FrameError::InvalidCallsign` if the value is empty, contains
    /// characters outside printable ASCII, or leaves no room for the frame header.
    pub fn new(value: impl Into<String>) -> Result<Self, FrameError> {
        let value = value.into();

        if value.is_empty() {
            return Err(FrameError::InvalidCallsign("callsign cannot be empty".to_string()));
        }

        if !value.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(FrameError::InvalidCallsign(format!(
                "callsign {:?} must be printable ASCII",
                value
            )));
        }

        // Leave room for the function ID and the optional data length byte
        if value.len() > FCP_MAX_FRAME_LENGTH - 2 {
            return Err(FrameError::InvalidCallsign(format!(
                "callsign length {} exceeds maximum {}",
                value.len(),
                FCP_MAX_FRAME_LENGTH - 2
            )));
        }

        Ok(Self(value))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Minimum number of bytes in a frame addressed with this callsign
    pub fn header_length(&self) -> usize {
        self.len() + 1
    }

    /// Largest optional data a frame with this callsign can carry
    pub fn max_optional_data_length(&self) -> usize {
        (FCP_MAX_FRAME_LENGTH - self.header_length() - 1).min(FCP_MAX_OPTIONAL_DATA_LENGTH)
    }
}

impl Default for Callsign {
    fn default() -> Self {
        Self(FCP_DEFAULT_CALLSIGN.to_string())
    }
}

impl TryFrom<String> for Callsign {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Callsign> for String {
    fn from(callsign: Callsign) -> Self {
        callsign.0
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Function ID byte
    pub function_id: u8,

    /// Optional data (empty when the frame carries none)
    pub optional_data: Bytes,
}

impl Frame {
    /// Interpret the function ID in the response namespace
    pub fn response_id(&self) -> ResponseId {
        ResponseId::from_function_id(self.function_id)
    }
}
