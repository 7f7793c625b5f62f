//! Hardware collaborator traits
//!
//! These traits define the interface between the boot, dispatch and
//! display logic and the board-specific drivers behind them.

pub mod actuator;
pub mod bus;
pub mod display;
pub mod link;
pub mod sensor;
pub mod timer;

pub use actuator::{Actuator, SineProfile};
pub use bus::{BusError, BusReceiver, Fault, FaultHandler, MotorRouter};
pub use display::{DisplayDriver, DisplayError, DisplayExt, LCD_COLS, LCD_ROWS};
pub use link::{CommLink, LinkError, SerialReceiver};
pub use sensor::{SensorError, SensorSubsystem};
pub use timer::{PeriodicTimer, TimerError};
