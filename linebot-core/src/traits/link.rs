//! Communication link traits
//!
//! The communication layer owns two logical serial endpoints (wired and
//! wireless) and the receive arming of every routed serial port.

use crate::dispatch::SerialPort;

/// Errors raised by the communication layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Port is not wired on this board
    NoSuchPort,
    /// Both endpoints name the same port
    DuplicateEndpoint,
    /// Peripheral refused the configuration
    Config,
    /// A receive is already pending on this port
    Busy,
}

/// Communication subsystem
pub trait CommLink {
    /// Initialise the link layer on its two endpoints
    fn init(&mut self, wired: SerialPort, wireless: SerialPort) -> Result<(), LinkError>;
}

/// Asynchronous serial receive arming
///
/// An armed receive completes once, `len` bytes later, through the serial
/// dispatch router. Whether it is armed again is decided by the completion
/// handler's [`RxAction`](crate::dispatch::RxAction).
pub trait SerialReceiver {
    /// Arm a receive of `len` bytes on `port`
    fn receive_async(&mut self, port: SerialPort, len: usize) -> Result<(), LinkError>;
}
