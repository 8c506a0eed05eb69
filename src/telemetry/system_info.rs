//! # System Info Telemetry
//!
//! Decodes the optional data of a `RESP_SYSTEM_INFO` frame.

use serde::Serialize;

use crate::error::DecodeError;

/// System info payload size (sum of all field widths)
pub const SYSTEM_INFO_PAYLOAD_SIZE: usize = 16;

/// Voltage step in mV per LSB
pub const VOLTAGE_MULTIPLIER: f32 = 20.0;

/// Charging current step in uA per LSB
pub const CURRENT_MULTIPLIER: f32 = 10.0;

/// Temperature step in m°C per LSB
pub const TEMPERATURE_MULTIPLIER: f32 = 10.0;

/// Number of solar cells reported
pub const SOLAR_CELL_COUNT: usize = 3;

/// Decoded satellite housekeeping telemetry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemInfo {
    /// Battery charging voltage in volts
    pub battery_charging_voltage: f32,

    /// Battery charging current in amperes
    pub battery_charging_current: f32,

    /// Battery voltage in volts
    pub battery_voltage: f32,

    /// Solar cell A, B and C voltages in volts
    pub solar_cell_voltage: [f32; SOLAR_CELL_COUNT],

    /// Battery temperature in °C
    pub battery_temperature: f32,

    /// Board temperature in °C
    pub board_temperature: f32,

    /// MCU temperature in °C
    pub mcu_temperature: f32,

    /// Satellite reset counter
    pub reset_counter: u16,

    /// Power configuration bits, opaque to the ground station
    pub power_configuration: u8,
}

/// Decode a system info payload
///
/// # Arguments
///
/// * `payload` - Optional data of a system info frame (16 bytes)
///
/// # Layout
///
/// All multi-byte fields are little-endian.
/// ```text
/// [0]      u8   battery charging voltage   × 20 mV
/// [1..3]   i16  battery charging current   × 10 uA
/// [3]      u8   battery voltage            × 20 mV
/// [4..7]   u8×3 solar cell A/B/C voltage   × 20 mV
/// [7..9]   i16  battery temperature        × 10 m°C
/// [9..11]  i16  board temperature          × 10 m°C
/// [11..13] i16  MCU temperature            × 10 m°C
/// [13..15] u16  reset counter
/// [15]     u8   power configuration
/// ```
///
/// # Errors
///
/// Returns `DecodeError::PayloadTooShort` if fewer than 16 bytes are given.
/// No partial record is produced.
pub fn decode_system_info(payload: &[u8]) -> Result<SystemInfo, DecodeError> {
    if payload.len() < SYSTEM_INFO_PAYLOAD_SIZE {
        return Err(DecodeError::PayloadTooShort {
            layout: "system info",
            expected: SYSTEM_INFO_PAYLOAD_SIZE,
            actual: payload.len(),
        });
    }

    let i16_at = |offset: usize| i16::from_le_bytes([payload[offset], payload[offset + 1]]);

    Ok(SystemInfo {
        battery_charging_voltage: voltage(payload[0]),
        battery_charging_current: i16_at(1) as f32 * CURRENT_MULTIPLIER / 1_000_000.0,
        battery_voltage: voltage(payload[3]),
        solar_cell_voltage: [voltage(payload[4]), voltage(payload[5]), voltage(payload[6])],
        battery_temperature: temperature(i16_at(7)),
        board_temperature: temperature(i16_at(9)),
        mcu_temperature: temperature(i16_at(11)),
        reset_counter: u16::from_le_bytes([payload[13], payload[14]]),
        power_configuration: payload[15],
    })
}

fn voltage(raw: u8) -> f32 {
    raw as f32 * VOLTAGE_MULTIPLIER / 1000.0
}

fn temperature(raw: i16) -> f32 {
    raw as f32 * TEMPERATURE_MULTIPLIER / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> Vec<u8> {
        let mut payload = Vec::with_capacity(SYSTEM_INFO_PAYLOAD_SIZE);
        payload.push(210); // 4.2 V charging
        payload.extend_from_slice(&1000i16.to_le_bytes()); // 10 mA
        payload.push(200); // 4.0 V battery
        payload.extend_from_slice(&[150, 100, 50]); // 3.0, 2.0, 1.0 V
        payload.extend_from_slice(&2350i16.to_le_bytes()); // 23.5 °C
        payload.extend_from_slice(&(-500i16).to_le_bytes()); // -5.0 °C
        payload.extend_from_slice(&4000i16.to_le_bytes()); // 40.0 °C
        payload.extend_from_slice(&513u16.to_le_bytes());
        payload.push(0b1010_0101);
        payload
    }

    #[test]
    fn test_decode_system_info_fields() {
        let info = decode_system_info(&sample_payload()).unwrap();

        assert_eq!(info.battery_charging_voltage, 4.2);
        assert_eq!(info.battery_charging_current, 0.01);
        assert_eq!(info.battery_voltage, 4.0);
        assert_eq!(info.solar_cell_voltage, [3.0, 2.0, 1.0]);
        assert_eq!(info.battery_temperature, 23.5);
        assert_eq!(info.board_temperature, -5.0);
        assert_eq!(info.mcu_temperature, 40.0);
        assert_eq!(info.reset_counter, 513);
        assert_eq!(info.power_configuration, 0b1010_0101);
    }

    #[test]
    fn test_decode_system_info_is_deterministic() {
        let payload: Vec<u8> = (0..SYSTEM_INFO_PAYLOAD_SIZE as u8).map(|b| b.wrapping_mul(37)).collect();

        let first = decode_system_info(&payload).unwrap();
        for _ in 0..10 {
            let again = decode_system_info(&payload).unwrap();
            assert_eq!(
                first.battery_charging_current.to_bits(),
                again.battery_charging_current.to_bits()
            );
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_decode_system_info_negative_current() {
        let mut payload = sample_payload();
        payload[1..3].copy_from_slice(&(-2500i16).to_le_bytes());

        let info = decode_system_info(&payload).unwrap();
        assert_eq!(info.battery_charging_current, -0.025);
    }

    #[test]
    fn test_decode_system_info_one_byte_short() {
        let payload = sample_payload();
        let result = decode_system_info(&payload[..SYSTEM_INFO_PAYLOAD_SIZE - 1]);

        assert_eq!(
            result,
            Err(DecodeError::PayloadTooShort {
                layout: "system info",
                expected: 16,
                actual: 15,
            })
        );
    }

    #[test]
    fn test_decode_system_info_empty_payload() {
        assert!(decode_system_info(&[]).is_err());
    }

    #[test]
    fn test_decode_system_info_ignores_extra_bytes() {
        let mut payload = sample_payload();
        payload.extend_from_slice(&[0xDE, 0xAD]);

        let info = decode_system_info(&payload).unwrap();
        assert_eq!(info.reset_counter, 513);
    }
}
