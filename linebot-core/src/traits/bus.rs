//! Motor bus collaborator traits

use crate::axis::Axes;
use crate::dispatch::{BusFrame, FrameHeader, RxFifo, BUS_PAYLOAD_LEN};

/// Errors raised by the bus peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// FIFO reported a message but none could be read
    Empty,
    /// Peripheral is bus-off or in an invalid state
    Peripheral,
    /// Frame carried more than eight data bytes
    Oversize,
}

/// Receive side of the motor bus peripheral
pub trait BusReceiver {
    /// Take the oldest frame from `fifo`
    fn receive_frame(&mut self, fifo: RxFifo) -> Result<BusFrame, BusError>;
}

/// Address-routed motor protocol handler
pub trait MotorRouter {
    /// Apply one received frame to the axis it addresses
    fn route(&mut self, axes: &mut Axes, header: &FrameHeader, payload: &[u8; BUS_PAYLOAD_LEN]);
}

/// Unrecoverable fault kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Frame retrieval failed after a new-message notification
    BusFrameRetrieval(BusError),
}

/// Global fatal error handler
///
/// On the target this halts the system; it is a trait so the dispatch path
/// can be exercised on the host.
pub trait FaultHandler {
    fn fatal(&mut self, fault: Fault);
}
