//! Board-agnostic core logic for the line follower controller
//!
//! This crate contains the parts of the firmware that do not depend on
//! a specific board:
//!
//! - Hardware collaborator traits (display, sensors, links, timer, bus)
//! - Startup sequencing
//! - Receive-complete dispatch for the serial links and the motor bus
//! - Display carousel with live value substitution
//! - One-shot task signalling
//! - Shared sensor and axis state
//! - Position-fix (NMEA GGA) and telemetry request decoding
//! - Configuration type definitions
//!
//! Everything here is allocation-free and bounded-time on the
//! interrupt-facing paths, so it can be driven from interrupt handlers.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod axis;
pub mod carousel;
pub mod config;
pub mod dispatch;
pub mod position;
pub mod sensors;
pub mod signal;
pub mod startup;
pub mod telemetry;
pub mod traits;
