//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! [`crate::channels`].

pub mod bus;
pub mod control;
pub mod display;
pub mod sensor;
pub mod serial;
pub mod tick;

pub use bus::bus_rx_task;
pub use control::control_task;
pub use display::display_task;
pub use sensor::sensor_task;
pub use serial::{link_tx_task, serial_rx_task};
pub use tick::tick_task;
