//! Hardware driver implementations
//!
//! Concrete implementations of the collaborator traits defined in
//! linebot-core, written against the `embedded-hal` 1.0 bus traits:
//!
//! - Character LCD (HD44780 behind a PCF8574 I2C expander)
//! - IMU (MPU-6050)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod imu;
pub mod lcd;

pub use imu::{ImuSample, Mpu6050};
pub use lcd::Hd44780;
