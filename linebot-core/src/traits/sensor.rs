//! Sensor subsystem trait

/// Errors raised while bringing the sensors up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// IMU did not answer its identity probe
    ImuNotFound,
    /// Bus transfer to a sensor failed
    Bus,
}

/// Sensor acquisition subsystem
///
/// Acquisition itself runs elsewhere and publishes into
/// [`SensorReadings`](crate::sensors::SensorReadings). The core only needs
/// the subsystem to be initialised before anything binds to those values.
pub trait SensorSubsystem {
    /// Initialise every sensor
    fn init(&mut self) -> Result<(), SensorError>;
}
