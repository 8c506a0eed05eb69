//! # Station Module
//!
//! The ground station itself: interrupt-driven receive, frame dispatch and
//! command transmission.
//!
//! This module handles:
//! - Radio start-up with progress reporting
//! - The race-free receive cycle (`Idle -> FramePending -> Processing -> Idle`)
//! - Routing decoded frames to telemetry decoders and the presenter
//! - Building and transmitting commands

pub mod receive_state;

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::RadioConfig;
use crate::display::{hex_dump, ErrorKind, Presenter};
use crate::error::{DecodeError, FrameError, GroundStationError, Result};
use crate::fcp::decoder::decode_frame;
use crate::fcp::encoder::encode_frame;
use crate::fcp::protocol::{Callsign, Command, Frame, ResponseId};
use crate::radio::{InterruptHandler, RadioDriver};
use crate::telemetry::{
    decode_last_packet_info, decode_repeated_message, decode_system_info, LastPacketInfo, SystemInfo,
};

pub use receive_state::{ReceiveFlag, ReceiveState};

/// Maximum relayed message length for retransmit requests
pub const MAX_RETRANSMIT_LENGTH: usize = 32;

/// A successfully interpreted response
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Pong,
    SystemInfo(SystemInfo),
    LastPacketInfo(LastPacketInfo),
    RepeatedMessage(Bytes),
    Unrecognized(u8),
}

/// Outcome of one receive cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Response(Response),
    /// Driver failed to hand over the frame
    ReceptionFailed { code: i16 },
    /// Frame was not valid for this station
    Rejected(FrameError),
    /// Known response with a malformed payload
    DecodeFailed { function_id: u8, error: DecodeError },
}

/// Ground station bound to one radio and one presenter
pub struct GroundStation<R: RadioDriver, P: Presenter> {
    radio: R,
    presenter: P,
    callsign: Callsign,
    flag: Arc<ReceiveFlag>,
    packets_received: u64,
}

impl<R: RadioDriver, P: Presenter> GroundStation<R, P> {
    pub fn new(radio: R, presenter: P, callsign: Callsign) -> Self {
        Self {
            radio,
            presenter,
            callsign,
            flag: Arc::new(ReceiveFlag::new()),
            packets_received: 0,
        }
    }

    /// Initialise the radio, attach the interrupt and start listening
    ///
    /// # Errors
    ///
    /// Returns `GroundStationError::Transport` if the radio fails to
    /// initialise or to enter receive mode. This is the only fatal condition.
    pub fn start(&mut self, config: &RadioConfig) -> Result<()> {
        self.presenter.progress(35);

        let status = self.radio.begin(config);
        if !status.is_ok() {
            self.presenter.error(ErrorKind::RadioInit, status.code() as i32);
            return status.check("initialization");
        }
        info!("Radio initialization successful");
        self.presenter.status_line("Radio initialization successful!");
        self.presenter.progress(50);

        self.radio.set_interrupt_action(self.interrupt_handler());
        debug!("Interrupt attached to {}", config.family.interrupt_line());
        self.presenter.progress(60);

        self.radio.start_receive().check("start receive")?;
        self.presenter.progress(75);

        Ok(())
    }

    /// Handler to register with the radio interrupt line
    pub fn interrupt_handler(&self) -> InterruptHandler {
        let flag = Arc::clone(&self.flag);
        Arc::new(move || {
            flag.signal();
        })
    }

    /// Interrupt entry point; sets the pending flag if idle, otherwise no-op
    pub fn on_radio_interrupt(&self) {
        self.flag.signal();
    }

    pub fn receive_state(&self) -> ReceiveState {
        self.flag.state()
    }

    pub fn callsign(&self) -> &Callsign {
        &self.callsign
    }

    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Drain and dispatch a pending frame, if any
    ///
    /// Runs on the main loop. Returns `None` when no interrupt has fired.
    /// Every error is reported to the presenter here; reception is always
    /// re-armed and the state always returns to `Idle`.
    pub fn poll_and_dispatch(&mut self) -> Option<Dispatch> {
        if !self.flag.begin_processing() {
            return None;
        }

        let outcome = self.receive_and_dispatch();

        let status = self.radio.start_receive();
        if !status.is_ok() {
            warn!("Failed to re-arm receiver, code {}", status);
        }
        self.flag.finish_processing();

        Some(outcome)
    }

    fn receive_and_dispatch(&mut self) -> Dispatch {
        self.packets_received += 1;

        let len = self.radio.packet_length();
        let mut buffer = vec![0u8; len];
        let status = self.radio.read_data(&mut buffer);

        if !status.is_ok() {
            warn!("Reception failed, code {}", status);
            self.presenter.error(ErrorKind::Reception, status.code() as i32);
            return Dispatch::ReceptionFailed { code: status.code() };
        }

        debug!("Received {} bytes:\n{}", len, hex_dump(&buffer));

        let frame = match decode_frame(&self.callsign, &Bytes::from(buffer)) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Dropping frame: {}", e);
                let kind = match e {
                    FrameError::NotAddressedToUs => ErrorKind::NotAddressedToUs,
                    _ => ErrorKind::Truncated,
                };
                self.presenter.error(kind, len as i32);
                return Dispatch::Rejected(e);
            }
        };

        debug!("Function ID: 0x{:02X}", frame.function_id);
        debug!(
            "Optional data ({} bytes):\n{}",
            frame.optional_data.len(),
            hex_dump(&frame.optional_data)
        );

        self.dispatch(frame)
    }

    fn dispatch(&mut self, frame: Frame) -> Dispatch {
        let function_id = frame.function_id;

        let decoded = match frame.response_id() {
            ResponseId::Pong => {
                self.presenter.status_line("Pong!");
                Ok(Response::Pong)
            }
            ResponseId::SystemInfo => decode_system_info(&frame.optional_data).map(|info| {
                self.presenter.telemetry(&info);
                Response::SystemInfo(info)
            }),
            ResponseId::LastPacketInfo => decode_last_packet_info(&frame.optional_data).map(|info| {
                self.presenter.packet_info(&info);
                Response::LastPacketInfo(info)
            }),
            ResponseId::RepeatedMessage | ResponseId::RepeatedMessageCustom => {
                let message = decode_repeated_message(frame.optional_data);
                self.presenter.relayed_text(&message);
                Ok(Response::RepeatedMessage(message))
            }
            ResponseId::Unrecognized(raw) => {
                info!("Unknown function ID 0x{:02X}", raw);
                self.presenter.error(ErrorKind::UnrecognizedFunctionId, raw as i32);
                Ok(Response::Unrecognized(raw))
            }
        };

        match decoded {
            Ok(response) => Dispatch::Response(response),
            Err(error) => {
                warn!("Failed to decode function ID 0x{:02X}: {}", function_id, error);
                self.presenter.error(ErrorKind::Decode, function_id as i32);
                Dispatch::DecodeFailed { function_id, error }
            }
        }
    }

    pub fn send_ping(&mut self) -> Result<()> {
        self.presenter.status_line("Sending ping frame ...");
        self.send_command(Command::Ping, None)
    }

    pub fn request_system_info(&mut self) -> Result<()> {
        self.presenter.status_line("Requesting system info ...");
        self.send_command(Command::TransmitSystemInfo, None)
    }

    pub fn request_last_packet_info(&mut self) -> Result<()> {
        self.presenter.status_line("Requesting last packet info ...");
        self.send_command(Command::GetLastPacketInfo, None)
    }

    /// Ask the satellite to repeat `message`
    ///
    /// # Errors
    ///
    /// Returns `FrameError::PayloadTooLarge` for messages over 32 bytes,
    /// or a transport error if transmission fails.
    pub fn request_retransmit(&mut self, message: &[u8]) -> Result<()> {
        if message.len() > MAX_RETRANSMIT_LENGTH {
            return Err(FrameError::PayloadTooLarge {
                len: message.len(),
                max: MAX_RETRANSMIT_LENGTH,
            }
            .into());
        }

        self.presenter.status_line("Requesting retransmission ...");
        self.send_command(Command::Retransmit, Some(message))
    }

    fn send_command(&mut self, command: Command, optional_data: Option<&[u8]>) -> Result<()> {
        let frame = encode_frame(&self.callsign, command.function_id(), optional_data)?;
        debug!("Transmitting {:?} ({} bytes)", command, frame.len());

        let status = self.radio.transmit(&frame);

        // Transmission leaves the chip in standby
        let rearm = self.radio.start_receive();
        if !rearm.is_ok() {
            warn!("Failed to re-arm receiver after transmit, code {}", rearm);
        }

        if status.is_ok() {
            self.presenter.status_line("sent successfully!");
            Ok(())
        } else {
            self.presenter.error(ErrorKind::Transmit, status.code() as i32);
            Err(GroundStationError::Transport {
                operation: "transmit",
                code: status.code(),
            })
        }
    }
}
