//! # FCP Module
//!
//! Implementation of the FOSSASAT-1 communication protocol (FCP) framing.
//!
//! This module handles:
//! - Frame encoding (callsign, function ID, optional data)
//! - Frame validation and address filtering on receive
//! - Command and response function ID namespaces

pub mod protocol;
pub mod encoder;
pub mod decoder;
