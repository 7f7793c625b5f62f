//! Startup sequencer
//!
//! One-time boot sequence. Every step must succeed before the next runs:
//!
//! 1. Display
//! 2. Sensors
//! 3. Communication links (wired + wireless endpoints)
//! 4. One-byte receive on the position-fix port
//! 5. Periodic carousel timer
//! 6. Control task start flag
//! 7. Actuator sine profile
//! 8. Boot status messages
//!
//! The control task is only released once display, sensors, links and
//! timer are up. After the last step the sequencer returns; from then on
//! the system is driven by interrupts and the executor idles.

use crate::carousel::{Carousel, CarouselError, DisplayMessage, LineSpec};
use crate::config::RobotConfig;
use crate::sensors::SensorReadings;
use crate::signal::{SignalError, TaskFlags, TaskId, TaskSignal};
use crate::traits::{
    Actuator, CommLink, DisplayDriver, DisplayError, LinkError, PeriodicTimer, SensorError,
    SensorSubsystem, SerialReceiver, TimerError,
};

/// Bytes per position-fix receive
const POSITION_FIX_RX_LEN: usize = 1;

/// Boot steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootStep {
    DisplayReady,
    SensorsReady,
    LinksReady,
    PositionFixArmed,
    TimerStarted,
    ControlReleased,
    ActuatorConfigured,
    CarouselPopulated,
}

/// A failed boot step
///
/// Boot failures are fatal; nothing here retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    Display(DisplayError),
    Sensors(SensorError),
    Link(LinkError),
    PositionFixArm(LinkError),
    Timer(TimerError),
    Signal(SignalError),
    Carousel(CarouselError),
}

/// Boot collaborators, borrowed for the duration of the sequence
pub struct Collaborators<'c, D, S, L, T, A, G> {
    pub display: &'c mut D,
    pub sensors: &'c mut S,
    pub link: &'c mut L,
    pub timer: &'c mut T,
    pub actuator: &'c mut A,
    pub signal: &'c mut G,
}

/// Status messages shown after boot
///
/// Lines are bound to the readings by reference, so the LCD follows the
/// live values.
pub fn boot_messages(readings: &SensorReadings, duration_ms: u32) -> [DisplayMessage<'_>; 3] {
    [
        DisplayMessage::new(
            duration_ms,
            LineSpec::value("Lat: %.2f", &readings.gps.latitude),
            LineSpec::value("Lon: %.2f", &readings.gps.longitude),
        ),
        DisplayMessage::new(
            duration_ms,
            LineSpec::value("Acc-X: %.4f", &readings.imu.accelerometer.x),
            LineSpec::value("Acc-Z: %.4f", &readings.imu.accelerometer.z),
        ),
        DisplayMessage::new(
            duration_ms,
            LineSpec::value("Temp: %.2f", &readings.imu.temperature),
            LineSpec::blank(),
        ),
    ]
}

/// Boot sequencer
pub struct Sequencer<'r> {
    config: &'r RobotConfig,
    readings: &'r SensorReadings,
}

impl<'r> Sequencer<'r> {
    pub fn new(config: &'r RobotConfig, readings: &'r SensorReadings) -> Self {
        Self { config, readings }
    }

    /// Run the boot sequence once
    ///
    /// `on_step` is called after each completed step. On error the
    /// remaining steps are skipped.
    pub fn run<D, S, L, T, A, G, const N: usize>(
        &self,
        hw: Collaborators<'_, D, S, L, T, A, G>,
        carousel: &mut Carousel<'r, N>,
        mut on_step: impl FnMut(BootStep),
    ) -> Result<(), BootError>
    where
        D: DisplayDriver,
        S: SensorSubsystem,
        L: CommLink + SerialReceiver,
        T: PeriodicTimer,
        A: Actuator,
        G: TaskSignal,
    {
        let serial = &self.config.serial;

        hw.display.init().map_err(BootError::Display)?;
        on_step(BootStep::DisplayReady);

        hw.sensors.init().map_err(BootError::Sensors)?;
        on_step(BootStep::SensorsReady);

        hw.link
            .init(serial.wired, serial.wireless)
            .map_err(BootError::Link)?;
        on_step(BootStep::LinksReady);

        hw.link
            .receive_async(serial.position_fix, POSITION_FIX_RX_LEN)
            .map_err(BootError::PositionFixArm)?;
        on_step(BootStep::PositionFixArmed);

        hw.timer.start_interrupt().map_err(BootError::Timer)?;
        on_step(BootStep::TimerStarted);

        hw.signal
            .set_flags(TaskId::Control, TaskFlags::CONTROL_START)
            .map_err(BootError::Signal)?;
        on_step(BootStep::ControlReleased);

        hw.actuator.configure_sinusoid(self.config.control.profile);
        on_step(BootStep::ActuatorConfigured);

        for message in boot_messages(self.readings, self.config.display.message_ms) {
            carousel.append(message).map_err(BootError::Carousel)?;
        }
        on_step(BootStep::CarouselPopulated);

        Ok(())
    }
}
