//! Configuration types
//!
//! Board-agnostic configuration of the robot. The firmware builds a
//! [`RobotConfig`] from `robot.toml` at compile time.

pub mod types;

pub use types::*;
