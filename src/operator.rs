//! # Operator Module
//!
//! Keyboard controls and retransmit message entry.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::station::MAX_RETRANSMIT_LENGTH;

/// Controls banner shown at start-up and after every received frame
pub const CONTROLS: &str = "\
------------- Controls -------------
p - send ping frame
i - request satellite info
l - request last packet info
r - send message to be retransmitted
------------------------------------";

/// Retransmit prompt
pub const RETRANSMIT_PROMPT: &str = "\
Enter message to be sent:
(max 32 characters, end with LF or CR+LF)";

/// Operator key commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Ping,
    RequestInfo,
    RequestPacketInfo,
    Retransmit,
    ShowControls,
}

impl OperatorCommand {
    /// Parse a command from the first non-blank character of an input line
    ///
    /// Returns `None` for a blank line; unknown keys map to `ShowControls`.
    pub fn parse(line: &str) -> Option<Self> {
        let key = line.trim().chars().next()?;

        Some(match key.to_ascii_lowercase() {
            'p' => OperatorCommand::Ping,
            'i' => OperatorCommand::RequestInfo,
            'l' => OperatorCommand::RequestPacketInfo,
            'r' => OperatorCommand::Retransmit,
            _ => OperatorCommand::ShowControls,
        })
    }
}

/// Collect a retransmit message from raw input bytes
///
/// Stops at the first CR or LF, or after 32 bytes, whichever comes first.
/// The terminator and anything after the cap are discarded.
pub fn collect_message<I>(input: I) -> Vec<u8>
where
    I: IntoIterator<Item = u8>,
{
    input
        .into_iter()
        .take_while(|&b| b != b'\r' && b != b'\n')
        .take(MAX_RETRANSMIT_LENGTH)
        .collect()
}

/// Read one line from `reader` and collect it as a retransmit message
///
/// Returns `Ok(None)` at end of input.
pub async fn read_message<R>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line).await? == 0 {
        return Ok(None);
    }

    Ok(Some(collect_message(line)))
}
