//! Motor bus glue between the FDCAN driver and the bus dispatcher

use defmt::*;
use embassy_stm32::can::Frame;
use embedded_can::{Frame as _, Id};

use linebot_core::dispatch::{BusFrame, FrameHeader, RxFifo};
use linebot_core::traits::{BusError, BusReceiver, Fault, FaultHandler};

/// Convert a received FDCAN frame
pub fn to_bus_frame(frame: &Frame) -> Result<BusFrame, BusError> {
    let (id, extended) = match frame.id() {
        Id::Standard(id) => (id.as_raw() as u32, false),
        Id::Extended(id) => (id.as_raw(), true),
    };
    let header = FrameHeader {
        id,
        extended,
        dlc: frame.dlc() as u8,
    };
    BusFrame::from_data(header, frame.data()).ok_or(BusError::Oversize)
}

/// The frame the driver already pulled off the FIFO
///
/// The async driver hands frames over on completion, so retrieval is a
/// take of the one frame delivered with the notification.
pub struct ReceivedFrame(Option<Result<BusFrame, BusError>>);

impl ReceivedFrame {
    pub fn new(frame: Result<BusFrame, BusError>) -> Self {
        Self(Some(frame))
    }
}

impl BusReceiver for ReceivedFrame {
    fn receive_frame(&mut self, _fifo: RxFifo) -> Result<BusFrame, BusError> {
        self.0.take().unwrap_or(Err(BusError::Empty))
    }
}

/// Fatal fault handler: log and halt
pub struct Halt;

impl FaultHandler for Halt {
    fn fatal(&mut self, fault: Fault) {
        error!("Fatal fault: {:?}", fault);
        panic!("fatal fault");
    }
}
