//! Receive-complete dispatch
//!
//! Routes hardware receive notifications to the protocol handler that owns
//! the source: serial ports by routing table, motor bus frames by header.

pub mod bus;
pub mod serial;

pub use bus::{BusDispatch, BusDispatcher, BusFrame, FrameHeader, RxFifo, RxFifoFlags, BUS_PAYLOAD_LEN};
pub use serial::{
    LinkId, RouteError, RxAction, SerialHandler, SerialPort, SerialRoute, SerialRouter,
    SERIAL_PORT_COUNT,
};
