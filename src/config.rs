//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{GroundStationError, Result};
use crate::fcp::protocol::Callsign;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub station: StationConfig,
    pub radio: RadioConfig,
    pub display: DisplayConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Station configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StationConfig {
    #[serde(default)]
    pub callsign: Callsign,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
}

/// Transceiver family
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChipFamily {
    #[default]
    Sx127x,
    Sx126x,
}

impl ChipFamily {
    pub fn default_sync_word(self) -> u16 {
        match self {
            ChipFamily::Sx127x => 0xFF,
            ChipFamily::Sx126x => 0x0F0F,
        }
    }

    /// Pin that raises the data-ready interrupt
    pub fn interrupt_line(self) -> &'static str {
        match self {
            ChipFamily::Sx127x => "DIO0",
            ChipFamily::Sx126x => "DIO1",
        }
    }
}

/// Radio pin assignments
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    #[serde(default = "default_pin_cs")]
    pub cs: u8,

    /// Data-ready interrupt (DIO0 on SX127x, DIO1 on SX126x)
    #[serde(default = "default_pin_irq")]
    pub irq: u8,

    #[serde(default = "default_pin_reset")]
    pub reset: u8,

    /// DIO1 on SX127x, BUSY on SX126x
    #[serde(default = "default_pin_aux")]
    pub aux: u8,
}

/// LoRa modem configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RadioConfig {
    #[serde(default)]
    pub family: ChipFamily,

    #[serde(default = "default_frequency_mhz")]
    pub frequency_mhz: f32,

    #[serde(default = "default_bandwidth_khz")]
    pub bandwidth_khz: f32,

    #[serde(default = "default_spreading_factor")]
    pub spreading_factor: u8,

    /// Denominator of the 4/x coding rate
    #[serde(default = "default_coding_rate")]
    pub coding_rate: u8,

    /// Overrides the family default when set
    #[serde(default)]
    pub sync_word: Option<u16>,

    #[serde(default)]
    pub pins: PinConfig,
}

impl RadioConfig {
    /// Effective sync word for the configured family
    pub fn sync_word(&self) -> u16 {
        self.sync_word.unwrap_or_else(|| self.family.default_sync_word())
    }
}

/// Presentation output format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    #[default]
    Text,
    Jsonl,
}

/// Display configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default)]
    pub format: DisplayFormat,

    #[serde(default = "default_show_controls")]
    pub show_controls: bool,
}

/// Simulated satellite configuration (raw on-air values)
#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,

    #[serde(default = "default_snr_raw")]
    pub snr_raw: u8,

    #[serde(default = "default_rssi_raw")]
    pub rssi_raw: u8,

    #[serde(default = "default_battery_voltage_raw")]
    pub battery_voltage_raw: u8,

    #[serde(default = "default_charging_current_raw")]
    pub charging_current_raw: i16,

    #[serde(default = "default_solar_cell_voltage_raw")]
    pub solar_cell_voltage_raw: [u8; 3],

    /// Battery, board and MCU temperature
    #[serde(default = "default_temperature_raw")]
    pub temperature_raw: [i16; 3],

    #[serde(default)]
    pub reset_counter: u16,

    #[serde(default)]
    pub power_configuration: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log to this file instead of stderr
    #[serde(default)]
    pub file: Option<String>,
}

// Default value functions
fn default_poll_interval_ms() -> u64 { 10 }
fn default_status_interval_ms() -> u64 { 1111 }

fn default_pin_cs() -> u8 { 18 }
fn default_pin_irq() -> u8 { 26 }
fn default_pin_reset() -> u8 { 14 }
fn default_pin_aux() -> u8 { 23 }

fn default_frequency_mhz() -> f32 { 436.7 }
fn default_bandwidth_khz() -> f32 { 125.0 }
fn default_spreading_factor() -> u8 { 11 }
fn default_coding_rate() -> u8 { 8 }

fn default_show_controls() -> bool { true }

fn default_response_delay_ms() -> u64 { 500 }
fn default_snr_raw() -> u8 { 0x28 }
fn default_rssi_raw() -> u8 { 0x10 }
fn default_battery_voltage_raw() -> u8 { 200 }
fn default_charging_current_raw() -> i16 { 1000 }
fn default_solar_cell_voltage_raw() -> [u8; 3] { [150, 150, 150] }
fn default_temperature_raw() -> [i16; 3] { [2000, 2500, 3000] }

fn default_log_level() -> String { "info".to_string() }

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            callsign: Callsign::default(),
            poll_interval_ms: default_poll_interval_ms(),
            status_interval_ms: default_status_interval_ms(),
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            cs: default_pin_cs(),
            irq: default_pin_irq(),
            reset: default_pin_reset(),
            aux: default_pin_aux(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            family: ChipFamily::default(),
            frequency_mhz: default_frequency_mhz(),
            bandwidth_khz: default_bandwidth_khz(),
            spreading_factor: default_spreading_factor(),
            coding_rate: default_coding_rate(),
            sync_word: None,
            pins: PinConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: DisplayFormat::default(),
            show_controls: default_show_controls(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay_ms(),
            snr_raw: default_snr_raw(),
            rssi_raw: default_rssi_raw(),
            battery_voltage_raw: default_battery_voltage_raw(),
            charging_current_raw: default_charging_current_raw(),
            solar_cell_voltage_raw: default_solar_cell_voltage_raw(),
            temperature_raw: default_temperature_raw(),
            reset_counter: 0,
            power_configuration: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> GroundStationError {
    GroundStationError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails (including an invalid callsign)
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fossa_ground_station::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate timing fields
        if self.station.poll_interval_ms == 0 || self.station.poll_interval_ms > 1000 {
            return Err(invalid("poll_interval_ms must be between 1 and 1000"));
        }

        if self.station.status_interval_ms == 0 || self.station.status_interval_ms > 60000 {
            return Err(invalid("status_interval_ms must be between 1 and 60000"));
        }

        // Validate modem settings
        if !(137.0..=1020.0).contains(&self.radio.frequency_mhz) {
            return Err(invalid("frequency_mhz must be between 137.0 and 1020.0"));
        }

        if self.radio.bandwidth_khz <= 0.0 || self.radio.bandwidth_khz > 500.0 {
            return Err(invalid("bandwidth_khz must be between 0.0 (exclusive) and 500.0"));
        }

        if !(6..=12).contains(&self.radio.spreading_factor) {
            return Err(invalid("spreading_factor must be between 6 and 12"));
        }

        if !(5..=8).contains(&self.radio.coding_rate) {
            return Err(invalid("coding_rate must be between 5 and 8"));
        }

        if self.radio.family == ChipFamily::Sx127x && self.radio.sync_word() > 0xFF {
            return Err(invalid(format!(
                "sync_word 0x{:X} does not fit the single-byte SX127x sync word",
                self.radio.sync_word()
            )));
        }

        let pins = self.radio.pins;
        let assigned = [pins.cs, pins.irq, pins.reset, pins.aux];
        for (i, pin) in assigned.iter().enumerate() {
            if assigned[i + 1..].contains(pin) {
                return Err(invalid(format!("pin {} is assigned more than once", pin)));
            }
        }

        if self.simulator.response_delay_ms > 60000 {
            return Err(invalid("response_delay_ms must be at most 60000"));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(format!("unknown log level '{}'", self.logging.level)));
        }

        Ok(())
    }
}
