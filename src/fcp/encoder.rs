//! # FCP Frame Encoder
//!
//! Builds outgoing frames from a callsign, a function ID and optional data.

use bytes::{BufMut, Bytes, BytesMut};

use super::protocol::Callsign;
use crate::error::FrameError;

/// Length of an encoded frame
///
/// Pure function of the callsign length and the optional data length:
/// `callsign + 1` without optional data, `callsign + 2 + len` with it.
pub fn frame_length(callsign: &Callsign, optional_data_len: usize) -> usize {
    if optional_data_len == 0 {
        callsign.header_length()
    } else {
        callsign.header_length() + 1 + optional_data_len
    }
}

/// Encode a complete FCP frame
///
/// # Arguments
///
/// * `callsign` - Satellite callsign placed at the start of the frame
/// * `function_id` - Function ID byte
/// * `optional_data` - Optional data; an empty slice is encoded like `None`
///
/// # Errors
///
/// Returns `FrameError::PayloadTooLarge` if the optional data does not fit the
/// length byte or the radio frame. Data is never truncated.
///
/// # Examples
///
/// ```
/// use fossa_ground_station::fcp::encoder::encode_frame;
/// use fossa_ground_station::fcp::protocol::{Callsign, CMD_PING};
///
/// let frame = encode_frame(&Callsign::default(), CMD_PING, None).unwrap();
/// assert_eq!(&frame[..], b"FOSSASAT-1\x00");
/// ```
pub fn encode_frame(
    callsign: &Callsign,
    function_id: u8,
    optional_data: Option<&[u8]>,
) -> Result<Bytes, FrameError> {
    let data = optional_data.unwrap_or_default();

    let max = callsign.max_optional_data_length();
    if data.len() > max {
        return Err(FrameError::PayloadTooLarge { len: data.len(), max });
    }

    let mut frame = BytesMut::with_capacity(frame_length(callsign, data.len()));
    frame.put_slice(callsign.as_bytes());
    frame.put_u8(function_id);

    if !data.is_empty() {
        frame.put_u8(data.len() as u8);
        frame.put_slice(data);
    }

    Ok(frame.freeze())
}
