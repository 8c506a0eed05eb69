//! # Telemetry Module
//!
//! Interprets the optional data of satellite responses.
//!
//! This module handles:
//! - System info housekeeping fields (fixed-point voltages, currents, temperatures)
//! - Last packet info (SNR / RSSI)
//! - Repeated message pass-through

pub mod packet_info;
pub mod system_info;

use bytes::Bytes;

pub use packet_info::{decode_last_packet_info, LastPacketInfo};
pub use system_info::{decode_system_info, SystemInfo};

/// Repeated messages carry the relayed bytes verbatim
pub fn decode_repeated_message(payload: Bytes) -> Bytes {
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_message_is_pass_through() {
        let payload = Bytes::from_static(b"hello \xFF world");
        assert_eq!(decode_repeated_message(payload.clone()), payload);
    }
}
