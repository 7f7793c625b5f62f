//! Configuration type definitions

use crate::axis::{AXIS_COUNT, DEFAULT_NODE_IDS};
use crate::dispatch::SerialPort;
use crate::traits::SineProfile;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bus bit rates the motor controllers accept
pub const SUPPORTED_BITRATES: [u32; 4] = [125_000, 250_000, 500_000, 1_000_000];

/// Largest node id expressible in a frame header
pub const MAX_NODE_ID: u8 = 0x3F;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Two roles share one serial port
    SharedSerialPort(SerialPort),
    /// Baud rate of zero
    InvalidBaudRate,
    /// Bit rate the controllers do not support
    UnsupportedBitrate(u32),
    /// Node id out of range or used twice
    InvalidNodeId(u8),
    /// Zero-length period
    ZeroPeriod,
    /// Message shorter than one carousel tick
    MessageShorterThanTick,
    /// Role assigned to a port the board does not wire for it
    UnwiredPort(SerialPort),
}

/// Serial port assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Cable link to the host
    pub wired: SerialPort,
    /// Bluetooth bridge
    pub wireless: SerialPort,
    /// GPS receiver
    pub position_fix: SerialPort,
    /// Baud rate of the wired link
    pub wired_baud: u32,
    /// Baud rate of the wireless bridge
    pub wireless_baud: u32,
    /// Baud rate of the GPS receiver
    pub position_fix_baud: u32,
}

impl SerialConfig {
    /// Check every role against the ports a board actually wires
    ///
    /// The links need both directions; the position fix only needs a
    /// receive line.
    pub fn check_wiring(
        &self,
        duplex: &[SerialPort],
        rx_only: &[SerialPort],
    ) -> Result<(), ConfigError> {
        for port in [self.wired, self.wireless] {
            if !duplex.contains(&port) {
                return Err(ConfigError::UnwiredPort(port));
            }
        }
        let fix = self.position_fix;
        if !duplex.contains(&fix) && !rx_only.contains(&fix) {
            return Err(ConfigError::UnwiredPort(fix));
        }
        Ok(())
    }
}

/// Motor bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// Nominal bit rate
    pub bitrate: u32,
    /// Node ids of the left and right wheel controllers
    pub node_ids: [u8; AXIS_COUNT],
}

/// Status display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Carousel timer period
    pub tick_ms: u32,
    /// How long each boot message stays up
    pub message_ms: u32,
    /// LCD redraw period
    pub refresh_ms: u32,
}

/// Sensor acquisition configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// IMU polling period
    pub sample_ms: u32,
}

/// Control task configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlConfig {
    /// Control loop period
    pub period_ms: u32,
    /// Actuator profile loaded at boot
    pub profile: SineProfile,
}

/// Complete robot configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobotConfig {
    pub serial: SerialConfig,
    pub bus: BusConfig,
    pub display: DisplayConfig,
    pub sensors: SensorConfig,
    pub control: ControlConfig,
}

impl RobotConfig {
    /// Stock wiring of the robot
    pub const fn default_config() -> Self {
        Self {
            serial: SerialConfig {
                wired: SerialPort::Usart3,
                wireless: SerialPort::Uart7,
                position_fix: SerialPort::Usart6,
                wired_baud: 1_000_000,
                wireless_baud: 115_200,
                position_fix_baud: 9_600,
            },
            bus: BusConfig {
                bitrate: 250_000,
                node_ids: DEFAULT_NODE_IDS,
            },
            display: DisplayConfig {
                tick_ms: 1,
                message_ms: 1000,
                refresh_ms: 200,
            },
            sensors: SensorConfig { sample_ms: 10 },
            control: ControlConfig {
                period_ms: 10,
                profile: SineProfile::BOOT,
            },
        }
    }

    /// Check the configuration for wiring and timing mistakes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let serial = &self.serial;
        if serial.wired == serial.wireless || serial.wired == serial.position_fix {
            return Err(ConfigError::SharedSerialPort(serial.wired));
        }
        if serial.wireless == serial.position_fix {
            return Err(ConfigError::SharedSerialPort(serial.wireless));
        }
        if serial.wired_baud == 0 || serial.wireless_baud == 0 || serial.position_fix_baud == 0 {
            return Err(ConfigError::InvalidBaudRate);
        }

        if !SUPPORTED_BITRATES.contains(&self.bus.bitrate) {
            return Err(ConfigError::UnsupportedBitrate(self.bus.bitrate));
        }
        let [left, right] = self.bus.node_ids;
        for id in [left, right] {
            if id > MAX_NODE_ID {
                return Err(ConfigError::InvalidNodeId(id));
            }
        }
        if left == right {
            return Err(ConfigError::InvalidNodeId(right));
        }

        let display = &self.display;
        let periods = [
            display.tick_ms,
            display.refresh_ms,
            self.sensors.sample_ms,
            self.control.period_ms,
        ];
        if periods.contains(&0) {
            return Err(ConfigError::ZeroPeriod);
        }
        if display.message_ms < display.tick_ms {
            return Err(ConfigError::MessageShorterThanTick);
        }

        Ok(())
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
