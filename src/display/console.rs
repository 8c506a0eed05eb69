//! Human-readable console presenter

use std::io::{self, Write};

use tracing::warn;

use super::{ErrorKind, Presenter};
use crate::telemetry::{LastPacketInfo, SystemInfo};

const PROGRESS_BAR_WIDTH: usize = 20;

/// Writes notifications as plain text lines
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl ConsolePresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_lines(&mut self, text: &str) {
        let result = writeln!(self.out, "{}", text).and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write to console: {}", e);
        }
    }
}

pub(crate) fn error_message(kind: ErrorKind, code: i32) -> String {
    match kind {
        ErrorKind::RadioInit => format!("Failed to initialize radio, code: {}", code),
        ErrorKind::Transmit => format!("Transmission failed, code {}", code),
        ErrorKind::Reception => format!("Reception failed, code {}", code),
        ErrorKind::Truncated => format!("Ignoring truncated frame ({} bytes)", code),
        ErrorKind::NotAddressedToUs => format!("Ignoring frame for another callsign ({} bytes)", code),
        ErrorKind::Decode => format!("Malformed payload for function ID 0x{:02X}", code),
        ErrorKind::UnrecognizedFunctionId => format!("Unknown function ID 0x{:02X}!", code),
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn progress(&mut self, percent: u8) {
        let percent = percent.min(100);
        let filled = PROGRESS_BAR_WIDTH * percent as usize / 100;
        let bar = format!(
            "[{}{}] {:>3}%",
            "#".repeat(filled),
            "-".repeat(PROGRESS_BAR_WIDTH - filled),
            percent
        );
        self.write_lines(&bar);
    }

    fn status_line(&mut self, text: &str) {
        self.write_lines(text);
    }

    fn telemetry(&mut self, info: &SystemInfo) {
        let [cell_a, cell_b, cell_c] = info.solar_cell_voltage;
        let text = format!(
            "System info:\n\
             batteryChargingVoltage = {:.2}\n\
             batteryChargingCurrent = {:.4}\n\
             batteryVoltage = {:.2}\n\
             solarCellAVoltage = {:.2}\n\
             solarCellBVoltage = {:.2}\n\
             solarCellCVoltage = {:.2}\n\
             batteryTemperature = {:.2}\n\
             boardTemperature = {:.2}\n\
             mcuTemperature = {:.2}\n\
             resetCounter = {}\n\
             powerConfig = 0b{:b}",
            info.battery_charging_voltage,
            info.battery_charging_current,
            info.battery_voltage,
            cell_a,
            cell_b,
            cell_c,
            info.battery_temperature,
            info.board_temperature,
            info.mcu_temperature,
            info.reset_counter,
            info.power_configuration,
        );
        self.write_lines(&text);
    }

    fn packet_info(&mut self, info: &LastPacketInfo) {
        let text = format!(
            "Last packet info:\nSNR = {:.2} dB\nRSSI = {:.2} dBm",
            info.snr_db, info.rssi_dbm
        );
        self.write_lines(&text);
    }

    fn relayed_text(&mut self, bytes: &[u8]) {
        let text = format!("Got repeated message:\n{}", String::from_utf8_lossy(bytes));
        self.write_lines(&text);
    }

    fn error(&mut self, kind: ErrorKind, code: i32) {
        self.write_lines(&error_message(kind, code));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(presenter: ConsolePresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_progress_bar() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.progress(0);
        presenter.progress(50);
        presenter.progress(150);

        let text = output(presenter);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[--------------------]   0%");
        assert_eq!(lines[1], "[##########----------]  50%");
        assert_eq!(lines[2], "[####################] 100%");
    }

    #[test]
    fn test_telemetry_formatting() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.telemetry(&SystemInfo {
            battery_charging_voltage: 4.2,
            battery_charging_current: 0.01,
            battery_voltage: 4.0,
            solar_cell_voltage: [3.0, 2.0, 1.0],
            battery_temperature: 23.5,
            board_temperature: -5.0,
            mcu_temperature: 40.0,
            reset_counter: 7,
            power_configuration: 0b101,
        });

        let text = output(presenter);
        assert!(text.starts_with("System info:\n"));
        assert!(text.contains("batteryChargingVoltage = 4.20\n"));
        assert!(text.contains("batteryChargingCurrent = 0.0100\n"));
        assert!(text.contains("solarCellCVoltage = 1.00\n"));
        assert!(text.contains("boardTemperature = -5.00\n"));
        assert!(text.contains("resetCounter = 7\n"));
        assert!(text.contains("powerConfig = 0b101\n"));
    }

    #[test]
    fn test_packet_info_formatting() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.packet_info(&LastPacketInfo {
            snr_db: 10.0,
            rssi_dbm: -8.0,
        });

        assert_eq!(output(presenter), "Last packet info:\nSNR = 10.00 dB\nRSSI = -8.00 dBm\n");
    }

    #[test]
    fn test_relayed_text_is_lossy() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.relayed_text(b"hi\xFF");

        assert_eq!(output(presenter), "Got repeated message:\nhi\u{FFFD}\n");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(error_message(ErrorKind::Reception, -7), "Reception failed, code -7");
        assert_eq!(
            error_message(ErrorKind::UnrecognizedFunctionId, 0x7F),
            "Unknown function ID 0x7F!"
        );
    }
}
