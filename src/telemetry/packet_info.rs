//! # Last Packet Info
//!
//! Link quality of the last frame the satellite received from us.

use serde::Serialize;

use crate::error::DecodeError;

/// Last packet info payload size
pub const LAST_PACKET_INFO_PAYLOAD_SIZE: usize = 2;

/// Link quality reported by the satellite
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LastPacketInfo {
    /// Signal-to-noise ratio in dB
    pub snr_db: f32,

    /// Received signal strength in dBm
    pub rssi_dbm: f32,
}

/// Decode a last packet info payload
///
/// Byte 0 is SNR in quarter dB, byte 1 is RSSI in negated half dBm.
///
/// # Errors
///
/// Returns `PayloadTooShort` / `PayloadTooLong` unless exactly 2 bytes are given.
pub fn decode_last_packet_info(payload: &[u8]) -> Result<LastPacketInfo, DecodeError> {
    match payload {
        &[snr, rssi] => Ok(LastPacketInfo {
            snr_db: snr as f32 / 4.0,
            rssi_dbm: rssi as f32 / -2.0,
        }),
        short if short.len() < LAST_PACKET_INFO_PAYLOAD_SIZE => Err(DecodeError::PayloadTooShort {
            layout: "last packet info",
            expected: LAST_PACKET_INFO_PAYLOAD_SIZE,
            actual: short.len(),
        }),
        long => Err(DecodeError::PayloadTooLong {
            layout: "last packet info",
            expected: LAST_PACKET_INFO_PAYLOAD_SIZE,
            actual: long.len(),
        }),
    }
}
