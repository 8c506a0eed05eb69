//! # FCP Frame Decoder
//!
//! Validates inbound frames and splits them into function ID and optional data.

use bytes::Bytes;
use tracing::trace;

use super::protocol::{Callsign, Frame};
use crate::error::FrameError;

/// Decode an inbound FCP frame
///
/// The returned optional data shares the input buffer; nothing is copied or
/// mutated.
///
/// # Arguments
///
/// * `callsign` - Callsign this station expects frames to carry
/// * `raw` - Raw frame as read from the radio
///
/// # Errors
///
/// Returns error if:
/// - Frame is shorter than `callsign + function ID` (`Truncated`)
/// - Callsign bytes differ from `callsign` (`NotAddressedToUs`)
/// - Declared optional data length runs past the buffer (`Truncated`)
pub fn decode_frame(callsign: &Callsign, raw: &Bytes) -> Result<Frame, FrameError> {
    let header_len = callsign.header_length();

    if raw.len() < header_len {
        return Err(FrameError::Truncated {
            expected: header_len,
            actual: raw.len(),
        });
    }

    // Case-sensitive, byte-for-byte
    if &raw[..callsign.len()] != callsign.as_bytes() {
        return Err(FrameError::NotAddressedToUs);
    }

    let function_id = raw[callsign.len()];

    // No length byte means no optional data
    if raw.len() == header_len {
        return Ok(Frame {
            function_id,
            optional_data: Bytes::new(),
        });
    }

    let data_len = raw[header_len] as usize;
    let data_start = header_len + 1;
    let data_end = data_start + data_len;

    if raw.len() < data_end {
        return Err(FrameError::Truncated {
            expected: data_end,
            actual: raw.len(),
        });
    }

    if raw.len() > data_end {
        trace!("Ignoring {} trailing bytes after optional data", raw.len() - data_end);
    }

    Ok(Frame {
        function_id,
        optional_data: raw.slice(data_start..data_end),
    })
}
