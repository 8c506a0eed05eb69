//! # Display Module
//!
//! Presentation of station activity to the operator.
//!
//! This module handles:
//! - The `Presenter` notification sink used by the station
//! - Human-readable console output
//! - JSON Lines output for piping into other tools
//! - The "Receiving" status animation

pub mod console;
pub mod jsonl;

use serde::Serialize;

use crate::telemetry::{LastPacketInfo, SystemInfo};

pub use console::ConsolePresenter;
pub use jsonl::JsonlPresenter;

/// Category of a reported failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Radio initialisation failed (code: driver status)
    RadioInit,
    /// Transmission failed (code: driver status)
    Transmit,
    /// Reading a received frame failed (code: driver status)
    Reception,
    /// Frame shorter than its header (code: received length)
    Truncated,
    /// Frame carries another callsign (code: received length)
    NotAddressedToUs,
    /// Payload of a known response has the wrong size (code: function ID)
    Decode,
    /// Function ID outside the response set (code: function ID)
    UnrecognizedFunctionId,
}

/// Sink for everything the station reports
///
/// Fire-and-forget: implementations swallow their own output errors.
pub trait Presenter {
    /// Startup progress, 0..=100
    fn progress(&mut self, percent: u8);

    fn status_line(&mut self, text: &str);

    fn telemetry(&mut self, info: &SystemInfo);

    fn packet_info(&mut self, info: &LastPacketInfo);

    fn relayed_text(&mut self, bytes: &[u8]);

    fn error(&mut self, kind: ErrorKind, code: i32);
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn progress(&mut self, percent: u8) {
        (**self).progress(percent)
    }

    fn status_line(&mut self, text: &str) {
        (**self).status_line(text)
    }

    fn telemetry(&mut self, info: &SystemInfo) {
        (**self).telemetry(info)
    }

    fn packet_info(&mut self, info: &LastPacketInfo) {
        (**self).packet_info(info)
    }

    fn relayed_text(&mut self, bytes: &[u8]) {
        (**self).relayed_text(bytes)
    }

    fn error(&mut self, kind: ErrorKind, code: i32) {
        (**self).error(kind, code)
    }
}

/// Format bytes as space-separated hex, 16 per line
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .map(|line| {
            line.iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cycling "Receiving", "Receiving.", ... status text
#[derive(Debug, Default)]
pub struct ReceivingIndicator {
    step: usize,
}

impl ReceivingIndicator {
    pub fn next_line(&mut self) -> String {
        self.step = (self.step + 1) % 4;
        format!("Receiving{}", ".".repeat(self.step))
    }
}
