//! Compiled-in robot configuration
//!
//! build.rs validates `robot.toml` and turns it into [`ROBOT_CONFIG`];
//! edit the file and rebuild to change it.

use linebot_core::config::{
    BusConfig, ControlConfig, DisplayConfig, RobotConfig, SensorConfig, SerialConfig,
};
use linebot_core::dispatch::SerialPort;
use linebot_core::traits::SineProfile;

include!(concat!(env!("OUT_DIR"), "/robot_config.rs"));
