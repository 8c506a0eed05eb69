//! # JSON Lines Presenter
//!
//! One JSON object per notification, each stamped with a UTC timestamp:
//! ```text
//! {"timestamp":"2026-10-19T12:00:00Z","event":"packet_info","snr_db":10.0,"rssi_dbm":-8.0}
//! ```

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::{ErrorKind, Presenter};
use crate::telemetry::{LastPacketInfo, SystemInfo};

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Progress { percent: u8 },
    Status { text: &'a str },
    Telemetry(&'a SystemInfo),
    PacketInfo(&'a LastPacketInfo),
    RelayedText { text: String, bytes: &'a [u8] },
    Error { kind: ErrorKind, code: i32, message: String },
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    record: Record<'a>,
}

/// Writes notifications as JSON Lines
pub struct JsonlPresenter<W: Write> {
    out: W,
}

impl JsonlPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonlPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: Record<'_>) {
        let envelope = Envelope {
            timestamp: Utc::now(),
            record,
        };

        let result = serde_json::to_writer(&mut self.out, &envelope)
            .map_err(io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());

        if let Err(e) = result {
            warn!("Failed to write JSON record: {}", e);
        }
    }
}

impl<W: Write> Presenter for JsonlPresenter<W> {
    fn progress(&mut self, percent: u8) {
        self.emit(Record::Progress { percent });
    }

    fn status_line(&mut self, text: &str) {
        self.emit(Record::Status { text });
    }

    fn telemetry(&mut self, info: &SystemInfo) {
        self.emit(Record::Telemetry(info));
    }

    fn packet_info(&mut self, info: &LastPacketInfo) {
        self.emit(Record::PacketInfo(info));
    }

    fn relayed_text(&mut self, bytes: &[u8]) {
        self.emit(Record::RelayedText {
            text: String::from_utf8_lossy(bytes).into_owned(),
            bytes,
        });
    }

    fn error(&mut self, kind: ErrorKind, code: i32) {
        self.emit(Record::Error {
            kind,
            code,
            message: super::console::error_message(kind, code),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn records(presenter: JsonlPresenter<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(presenter.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_packet_info_record() {
        let mut presenter = JsonlPresenter::new(Vec::new());
        presenter.packet_info(&LastPacketInfo {
            snr_db: 10.0,
            rssi_dbm: -8.0,
        });

        let records = records(presenter);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["event"], "packet_info");
        assert_eq!(records[0]["snr_db"], 10.0);
        assert_eq!(records[0]["rssi_dbm"], -8.0);
        assert!(records[0]["timestamp"].is_string());
    }

    #[test]
    fn test_telemetry_record() {
        let mut presenter = JsonlPresenter::new(Vec::new());
        presenter.telemetry(&SystemInfo {
            battery_charging_voltage: 4.0,
            battery_charging_current: 0.5,
            battery_voltage: 4.0,
            solar_cell_voltage: [3.0, 2.0, 1.0],
            battery_temperature: 23.5,
            board_temperature: -5.0,
            mcu_temperature: 40.0,
            reset_counter: 7,
            power_configuration: 5,
        });

        let record = &records(presenter)[0];
        assert_eq!(record["event"], "telemetry");
        assert_eq!(record["solar_cell_voltage"][2], 1.0);
        assert_eq!(record["reset_counter"], 7);
    }

    #[test]
    fn test_error_and_status_records() {
        let mut presenter = JsonlPresenter::new(Vec::new());
        presenter.status_line("Pong!");
        presenter.error(ErrorKind::UnrecognizedFunctionId, 0x7F);
        presenter.relayed_text(b"hello");

        let records = records(presenter);
        assert_eq!(records[0]["event"], "status");
        assert_eq!(records[0]["text"], "Pong!");
        assert_eq!(records[1]["kind"], "unrecognized_function_id");
        assert_eq!(records[1]["code"], 127);
        assert_eq!(records[2]["text"], "hello");
        assert_eq!(records[2]["bytes"][0], 104);
    }
}
