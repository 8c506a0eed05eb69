//! # Radio Module
//!
//! Driver contract for the LoRa transceiver.
//!
//! This module handles:
//! - The `RadioDriver` trait the ground station talks to
//! - Driver status codes (RadioLib numbering)
//! - Interrupt callback registration
//! - An in-process satellite simulator for running without hardware

pub mod simulator;

use std::fmt;
use std::sync::Arc;

use crate::config::RadioConfig;
use crate::error::{GroundStationError, Result};

pub use simulator::SimulatedRadio;

/// Callback run from interrupt context when the radio signals a received frame
///
/// Must be O(1) and must not block or allocate.
pub type InterruptHandler = Arc<dyn Fn() + Send + Sync>;

/// Status code returned by the radio driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioStatus(pub i16);

impl RadioStatus {
    /// No error
    pub const NONE: RadioStatus = RadioStatus(0);
    pub const UNKNOWN: RadioStatus = RadioStatus(-1);
    pub const CHIP_NOT_FOUND: RadioStatus = RadioStatus(-2);
    pub const PACKET_TOO_LONG: RadioStatus = RadioStatus(-4);
    pub const TX_TIMEOUT: RadioStatus = RadioStatus(-5);
    pub const RX_TIMEOUT: RadioStatus = RadioStatus(-6);
    pub const CRC_MISMATCH: RadioStatus = RadioStatus(-7);

    pub fn is_ok(self) -> bool {
        self == Self::NONE
    }

    pub fn code(self) -> i16 {
        self.0
    }

    /// Convert into a `Result`, tagging failures with the operation name
    ///
    /// # Errors
    ///
    /// Returns `GroundStationError::Transport` for any non-`NONE` status.
    pub fn check(self, operation: &'static str) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(GroundStationError::Transport {
                operation,
                code: self.0,
            })
        }
    }
}

impl fmt::Display for RadioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// LoRa transceiver driver contract
///
/// Everything except the interrupt handler runs on the main loop.
#[cfg_attr(test, mockall::automock)]
pub trait RadioDriver {
    /// Reset and configure the chip
    fn begin(&mut self, config: &RadioConfig) -> RadioStatus;

    /// Transmit one frame, blocking until it is on air
    fn transmit(&mut self, data: &[u8]) -> RadioStatus;

    /// Put the radio into receive mode
    fn start_receive(&mut self) -> RadioStatus;

    /// Length of the frame currently held in the receive buffer
    fn packet_length(&mut self) -> usize;

    /// Copy the received frame into `buffer`
    fn read_data(&mut self, buffer: &mut [u8]) -> RadioStatus;

    /// Register the callback fired on the data-ready interrupt line
    fn set_interrupt_action(&mut self, handler: InterruptHandler);
}
