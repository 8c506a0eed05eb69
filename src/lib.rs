//! # FOSSA Ground Station Library
//!
//! Ground station endpoint for the FOSSASAT-1 LoRa telemetry and command link.
//!
//! This library provides the frame codec (FCP), telemetry decoding and the
//! interrupt-driven receive/dispatch state machine, independent of the
//! actual transceiver driver and of how results are presented.

pub mod config;
pub mod display;
pub mod error;
pub mod fcp;
pub mod operator;
pub mod radio;
pub mod station;
pub mod telemetry;
