//! # Simulated Radio
//!
//! In-process stand-in for the LoRa transceiver and the satellite on the other
//! end of the link. Useful for development without hardware and for end-to-end
//! tests of the receive path.
//!
//! Every transmitted command addressed to the configured callsign is answered
//! the way FOSSASAT-1 answers it. The answer lands in a single-frame receive
//! buffer and the registered interrupt handler fires, either immediately or
//! from a background thread after `response_delay_ms`. A new arrival
//! overwrites an undrained frame, like the chip FIFO does.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use super::{InterruptHandler, RadioDriver, RadioStatus};
use crate::config::{RadioConfig, SimulatorConfig};
use crate::fcp::decoder::decode_frame;
use crate::fcp::encoder::encode_frame;
use crate::fcp::protocol::*;
use crate::telemetry::system_info::SYSTEM_INFO_PAYLOAD_SIZE;

#[derive(Default)]
struct SharedState {
    rx_buffer: Option<Bytes>,
    handler: Option<InterruptHandler>,
}

fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Place a frame in the receive buffer and raise the interrupt line
fn deliver(shared: &Mutex<SharedState>, frame: Bytes) {
    let handler = {
        let mut state = lock(shared);
        if state.rx_buffer.is_some() {
            debug!("Simulator overwriting undrained frame");
        }
        state.rx_buffer = Some(frame);
        state.handler.clone()
    };

    // Fire outside the lock, as hardware would
    if let Some(handler) = handler {
        handler();
    }
}

/// Handle for pushing arbitrary frames into the simulated receiver
#[derive(Clone)]
pub struct FrameInjector {
    shared: Arc<Mutex<SharedState>>,
}

impl FrameInjector {
    pub fn inject(&self, frame: Bytes) {
        deliver(&self.shared, frame);
    }
}

/// Simulated LoRa radio with a FOSSASAT-1 responder behind it
pub struct SimulatedRadio {
    callsign: Callsign,
    config: SimulatorConfig,
    shared: Arc<Mutex<SharedState>>,
    transmitted: Vec<Bytes>,
    init_status: RadioStatus,
    read_failure: Option<RadioStatus>,
    receive_arm_count: usize,
}

impl std::fmt::Debug for SimulatedRadio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedRadio")
            .field("callsign", &self.callsign)
            .field("transmitted", &self.transmitted.len())
            .finish_non_exhaustive()
    }
}

impl SimulatedRadio {
    /// Create a simulator answering to `callsign`
    pub fn new(callsign: Callsign, config: SimulatorConfig) -> Self {
        Self {
            callsign,
            config,
            shared: Arc::new(Mutex::new(SharedState::default())),
            transmitted: Vec::new(),
            init_status: RadioStatus::NONE,
            read_failure: None,
            receive_arm_count: 0,
        }
    }

    /// Make `begin` report `status`, e.g. to simulate a missing chip
    pub fn with_init_status(mut self, status: RadioStatus) -> Self {
        self.init_status = status;
        self
    }

    /// Make the next `read_data` call fail with `status`
    pub fn fail_next_read(&mut self, status: RadioStatus) {
        self.read_failure = Some(status);
    }

    pub fn injector(&self) -> FrameInjector {
        FrameInjector {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Frames transmitted so far, oldest first
    pub fn transmitted(&self) -> &[Bytes] {
        &self.transmitted
    }

    /// Number of times reception has been (re)armed
    pub fn receive_arm_count(&self) -> usize {
        self.receive_arm_count
    }

    /// Build the satellite's answer to an uplink frame
    fn respond(&self, uplink: &[u8]) -> Option<Bytes> {
        let frame = match decode_frame(&self.callsign, &Bytes::copy_from_slice(uplink)) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Simulated satellite ignoring uplink: {}", e);
                return None;
            }
        };

        let (function_id, data): (u8, Option<Vec<u8>>) = match Command::from_function_id(frame.function_id)? {
            Command::Ping => (RESP_PONG, None),
            Command::Retransmit => (RESP_REPEATED_MESSAGE, Some(frame.optional_data.to_vec())),
            Command::RetransmitCustom => (RESP_REPEATED_MESSAGE_CUSTOM, Some(frame.optional_data.to_vec())),
            Command::TransmitSystemInfo => (RESP_SYSTEM_INFO, Some(self.system_info_payload())),
            Command::GetLastPacketInfo => (
                RESP_LAST_PACKET_INFO,
                Some(vec![self.config.snr_raw, self.config.rssi_raw]),
            ),
        };

        encode_frame(&self.callsign, function_id, data.as_deref()).ok()
    }

    fn system_info_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(SYSTEM_INFO_PAYLOAD_SIZE);
        payload.push(self.config.battery_voltage_raw); // charging voltage
        payload.extend_from_slice(&self.config.charging_current_raw.to_le_bytes());
        payload.push(self.config.battery_voltage_raw);
        payload.extend_from_slice(&self.config.solar_cell_voltage_raw);
        for temperature in self.config.temperature_raw {
            payload.extend_from_slice(&temperature.to_le_bytes());
        }
        payload.extend_from_slice(&self.config.reset_counter.to_le_bytes());
        payload.push(self.config.power_configuration);
        payload
    }
}

impl RadioDriver for SimulatedRadio {
    fn begin(&mut self, config: &RadioConfig) -> RadioStatus {
        info!(
            "Simulated {:?} at {} MHz, BW {} kHz, SF{}, CR 4/{}, sync word 0x{:X}",
            config.family,
            config.frequency_mhz,
            config.bandwidth_khz,
            config.spreading_factor,
            config.coding_rate,
            config.sync_word()
        );
        self.init_status
    }

    fn transmit(&mut self, data: &[u8]) -> RadioStatus {
        if data.len() > FCP_MAX_FRAME_LENGTH {
            return RadioStatus::PACKET_TOO_LONG;
        }

        self.transmitted.push(Bytes::copy_from_slice(data));

        let Some(response) = self.respond(data) else {
            return RadioStatus::NONE;
        };

        if self.config.response_delay_ms == 0 {
            deliver(&self.shared, response);
        } else {
            let shared = Arc::clone(&self.shared);
            let delay = Duration::from_millis(self.config.response_delay_ms);
            thread::spawn(move || {
                thread::sleep(delay);
                deliver(&shared, response);
            });
        }

        RadioStatus::NONE
    }

    fn start_receive(&mut self) -> RadioStatus {
        self.receive_arm_count += 1;
        RadioStatus::NONE
    }

    fn packet_length(&mut self) -> usize {
        lock(&self.shared).rx_buffer.as_ref().map_or(0, Bytes::len)
    }

    fn read_data(&mut self, buffer: &mut [u8]) -> RadioStatus {
        if let Some(status) = self.read_failure.take() {
            lock(&self.shared).rx_buffer = None;
            return status;
        }

        let Some(frame) = lock(&self.shared).rx_buffer.take() else {
            warn!("Simulator read with empty receive buffer");
            return RadioStatus::RX_TIMEOUT;
        };

        let len = frame.len().min(buffer.len());
        buffer[..len].copy_from_slice(&frame[..len]);
        RadioStatus::NONE
    }

    fn set_interrupt_action(&mut self, handler: InterruptHandler) {
        lock(&self.shared).handler = Some(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn instant_config() -> SimulatorConfig {
        SimulatorConfig {
            response_delay_ms: 0,
            ..SimulatorConfig::default()
        }
    }

    fn read_frame(radio: &mut SimulatedRadio) -> Vec<u8> {
        let mut buffer = vec![0u8; radio.packet_length()];
        assert_eq!(radio.read_data(&mut buffer), RadioStatus::NONE);
        buffer
    }

    #[test]
    fn test_ping_is_answered_with_pong() {
        let callsign = Callsign::default();
        let mut radio = SimulatedRadio::new(callsign.clone(), instant_config());
        let ping = encode_frame(&callsign, CMD_PING, None).unwrap();

        assert_eq!(radio.transmit(&ping), RadioStatus::NONE);
        assert_eq!(read_frame(&mut radio), b"FOSSASAT-1\x10");
        assert_eq!(radio.transmitted(), &[ping]);
    }

    #[test]
    fn test_interrupt_fires_on_delivery() {
        let callsign = Callsign::default();
        let mut radio = SimulatedRadio::new(callsign.clone(), instant_config());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        radio.set_interrupt_action(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        radio.injector().inject(Bytes::from_static(b"anything"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(radio.packet_length(), 8);
    }

    #[test]
    fn test_uplink_for_other_callsign_is_ignored() {
        let mut radio = SimulatedRadio::new(Callsign::default(), instant_config());
        let other = Callsign::new("OTHERSAT").unwrap();

        radio.transmit(&encode_frame(&other, CMD_PING, None).unwrap());
        assert_eq!(radio.packet_length(), 0);
    }

    #[test]
    fn test_system_info_payload_size() {
        let radio = SimulatedRadio::new(Callsign::default(), instant_config());
        assert_eq!(radio.system_info_payload().len(), SYSTEM_INFO_PAYLOAD_SIZE);
    }

    #[test]
    fn test_read_failure_is_reported_once() {
        let mut radio = SimulatedRadio::new(Callsign::default(), instant_config());
        radio.injector().inject(Bytes::from_static(b"FOSSASAT-1\x10"));
        radio.fail_next_read(RadioStatus::CRC_MISMATCH);

        let mut buffer = [0u8; 11];
        assert_eq!(radio.read_data(&mut buffer), RadioStatus::CRC_MISMATCH);
        assert_eq!(radio.read_data(&mut buffer), RadioStatus::RX_TIMEOUT);
    }

    #[test]
    fn test_oversized_transmit_rejected() {
        let mut radio = SimulatedRadio::new(Callsign::default(), instant_config());
        assert_eq!(radio.transmit(&[0u8; 256]), RadioStatus::PACKET_TOO_LONG);
        assert!(radio.transmitted().is_empty());
    }
}
