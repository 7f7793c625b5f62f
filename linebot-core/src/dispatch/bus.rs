//! Motor bus receive-complete dispatch
//!
//! The bus peripheral raises a FIFO notification carrying a bitmask of
//! FIFO events. On a new message the frame is pulled out of the FIFO,
//! its header decoded, and the payload handed to the motor protocol router
//! together with the shared axis state. The whole path runs inside the
//! notification and touches only stack storage.

use crate::axis::Axes;
use crate::traits::{BusReceiver, Fault, FaultHandler, MotorRouter};

/// Data bytes in a motor bus frame
pub const BUS_PAYLOAD_LEN: usize = 8;

/// Receive FIFO of the bus peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxFifo {
    Fifo0,
    Fifo1,
}

/// FIFO event flags delivered with a receive notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxFifoFlags(u32);

impl RxFifoFlags {
    /// A new message was written to the FIFO
    pub const NEW_MESSAGE: Self = Self(1 << 0);
    /// FIFO fill level reached its watermark
    pub const WATERMARK: Self = Self(1 << 1);
    /// FIFO is full
    pub const FULL: Self = Self(1 << 2);
    /// A message was dropped because the FIFO was full
    pub const MESSAGE_LOST: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for RxFifoFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Decoded frame header
///
/// Motor controllers are addressed by an 11-bit identifier split into a
/// 6-bit node id and a 5-bit command id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Raw identifier
    pub id: u32,
    /// 29-bit identifier format
    pub extended: bool,
    /// Data length code (0-8)
    pub dlc: u8,
}

impl FrameHeader {
    /// Bits of the identifier used by the command id
    const COMMAND_BITS: u32 = 5;

    /// Header for a standard-id frame
    pub const fn standard(id: u16, dlc: u8) -> Self {
        Self {
            id: id as u32,
            extended: false,
            dlc,
        }
    }

    /// Header addressed to `node` carrying `command`
    pub const fn addressed(node: u8, command: u8, dlc: u8) -> Self {
        Self::standard(
            ((node as u16) << Self::COMMAND_BITS) | (command as u16 & 0x1F),
            dlc,
        )
    }

    /// Addressed node
    pub const fn node_id(&self) -> u8 {
        ((self.id >> Self::COMMAND_BITS) & 0x3F) as u8
    }

    /// Command carried by the frame
    pub const fn command_id(&self) -> u8 {
        (self.id & 0x1F) as u8
    }
}

/// A frame pulled from a receive FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusFrame {
    pub header: FrameHeader,
    /// Data bytes, zero padded past `header.dlc`
    pub payload: [u8; BUS_PAYLOAD_LEN],
}

impl BusFrame {
    /// Build a frame from received data, zero padding to eight bytes
    ///
    /// Returns `None` if `data` is longer than a frame.
    pub fn from_data(header: FrameHeader, data: &[u8]) -> Option<Self> {
        if data.len() > BUS_PAYLOAD_LEN {
            return None;
        }
        let mut payload = [0u8; BUS_PAYLOAD_LEN];
        payload[..data.len()].copy_from_slice(data);
        Some(Self { header, payload })
    }
}

/// Result of one bus notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusDispatch {
    /// Frame routed to the motor protocol
    Routed(FrameHeader),
    /// No new message in the notification
    Ignored,
    /// Retrieval failed and the fault handler was invoked
    Faulted,
}

/// Bus dispatch router for one receive FIFO
#[derive(Debug, Clone)]
pub struct BusDispatcher {
    fifo: RxFifo,
    routed: u32,
    overruns: u32,
}

impl BusDispatcher {
    /// Dispatcher reading from `fifo`
    pub const fn new(fifo: RxFifo) -> Self {
        Self {
            fifo,
            routed: 0,
            overruns: 0,
        }
    }

    /// FIFO this dispatcher drains
    pub fn fifo(&self) -> RxFifo {
        self.fifo
    }

    /// Frames routed so far
    pub fn routed(&self) -> u32 {
        self.routed
    }

    /// Notifications that reported a full FIFO or a lost message
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Handle one FIFO notification
    ///
    /// Only [`RxFifoFlags::NEW_MESSAGE`] pulls a frame. Full and lost-message
    /// flags are counted; they do not open an error path.
    pub fn on_notification<B, R, F>(
        &mut self,
        flags: RxFifoFlags,
        bus: &mut B,
        router: &mut R,
        axes: &mut Axes,
        faults: &mut F,
    ) -> BusDispatch
    where
        B: BusReceiver,
        R: MotorRouter,
        F: FaultHandler,
    {
        if flags.intersects(RxFifoFlags::FULL | RxFifoFlags::MESSAGE_LOST) {
            self.overruns = self.overruns.wrapping_add(1);
        }

        if !flags.contains(RxFifoFlags::NEW_MESSAGE) {
            return BusDispatch::Ignored;
        }

        match bus.receive_frame(self.fifo) {
            Ok(frame) => {
                router.route(axes, &frame.header, &frame.payload);
                self.routed = self.routed.wrapping_add(1);
                BusDispatch::Routed(frame.header)
            }
            Err(e) => {
                faults.fatal(Fault::BusFrameRetrieval(e));
                BusDispatch::Faulted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BusError;
    use heapless::Vec;

    struct FakeBus {
        next: Option<Result<BusFrame, BusError>>,
        reads: u8,
        last_fifo: Option<RxFifo>,
    }

    impl FakeBus {
        fn with(next: Result<BusFrame, BusError>) -> Self {
            Self {
                next: Some(next),
                reads: 0,
                last_fifo: None,
            }
        }
    }

    impl BusReceiver for FakeBus {
        fn receive_frame(&mut self, fifo: RxFifo) -> Result<BusFrame, BusError> {
            self.reads += 1;
            self.last_fifo = Some(fifo);
            self.next.take().unwrap_or(Err(BusError::Empty))
        }
    }

    #[derive(Default)]
    struct RouteLog {
        seen: Vec<(FrameHeader, [u8; BUS_PAYLOAD_LEN]), 4>,
    }

    impl MotorRouter for RouteLog {
        fn route(&mut self, _axes: &mut Axes, header: &FrameHeader, payload: &[u8; BUS_PAYLOAD_LEN]) {
            self.seen.push((*header, *payload)).unwrap();
        }
    }

    #[derive(Default)]
    struct FaultLog {
        faults: Vec<Fault, 4>,
    }

    impl FaultHandler for FaultLog {
        fn fatal(&mut self, fault: Fault) {
            self.faults.push(fault).unwrap();
        }
    }

    fn sample_frame() -> BusFrame {
        BusFrame::from_data(FrameHeader::addressed(3, 0x09, 8), &[1, 2, 3, 4, 5, 6, 7, 8])
            .unwrap()
    }

    #[test]
    fn test_new_message_routes_once() {
        let mut dispatcher = BusDispatcher::new(RxFifo::Fifo0);
        let mut bus = FakeBus::with(Ok(sample_frame()));
        let mut router = RouteLog::default();
        let mut faults = FaultLog::default();
        let mut axes = Axes::new();

        let result = dispatcher.on_notification(
            RxFifoFlags::NEW_MESSAGE,
            &mut bus,
            &mut router,
            &mut axes,
            &mut faults,
        );

        assert_eq!(result, BusDispatch::Routed(sample_frame().header));
        assert_eq!(bus.last_fifo, Some(RxFifo::Fifo0));
        assert_eq!(router.seen.len(), 1);
        assert_eq!(router.seen[0].0.node_id(), 3);
        assert_eq!(router.seen[0].1, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(faults.faults.is_empty());
        assert_eq!(dispatcher.routed(), 1);
    }

    #[test]
    fn test_retrieval_failure_is_fatal() {
        let mut dispatcher = BusDispatcher::new(RxFifo::Fifo0);
        let mut bus = FakeBus::with(Err(BusError::Peripheral));
        let mut router = RouteLog::default();
        let mut faults = FaultLog::default();
        let mut axes = Axes::new();

        let result = dispatcher.on_notification(
            RxFifoFlags::NEW_MESSAGE,
            &mut bus,
            &mut router,
            &mut axes,
            &mut faults,
        );

        assert_eq!(result, BusDispatch::Faulted);
        assert!(router.seen.is_empty());
        assert_eq!(
            faults.faults.as_slice(),
            &[Fault::BusFrameRetrieval(BusError::Peripheral)]
        );
    }

    #[test]
    fn test_other_flags_do_not_read() {
        let mut dispatcher = BusDispatcher::new(RxFifo::Fifo0);
        let mut bus = FakeBus::with(Ok(sample_frame()));
        let mut router = RouteLog::default();
        let mut faults = FaultLog::default();
        let mut axes = Axes::new();

        let result = dispatcher.on_notification(
            RxFifoFlags::WATERMARK | RxFifoFlags::MESSAGE_LOST,
            &mut bus,
            &mut router,
            &mut axes,
            &mut faults,
        );

        assert_eq!(result, BusDispatch::Ignored);
        assert_eq!(bus.reads, 0);
        assert!(router.seen.is_empty());
        assert!(faults.faults.is_empty());
        assert_eq!(dispatcher.overruns(), 1);
    }

    #[test]
    fn test_overrun_with_new_message_still_routes() {
        let mut dispatcher = BusDispatcher::new(RxFifo::Fifo1);
        let mut bus = FakeBus::with(Ok(sample_frame()));
        let mut router = RouteLog::default();
        let mut faults = FaultLog::default();
        let mut axes = Axes::new();

        let result = dispatcher.on_notification(
            RxFifoFlags::NEW_MESSAGE | RxFifoFlags::FULL,
            &mut bus,
            &mut router,
            &mut axes,
            &mut faults,
        );

        assert!(matches!(result, BusDispatch::Routed(_)));
        assert_eq!(bus.last_fifo, Some(RxFifo::Fifo1));
        assert_eq!(dispatcher.overruns(), 1);
    }

    #[test]
    fn test_header_addressing() {
        let header = FrameHeader::addressed(0x3F, 0x1F, 8);
        assert_eq!(header.id, 0x7FF);
        assert_eq!(header.node_id(), 0x3F);
        assert_eq!(header.command_id(), 0x1F);

        let header = FrameHeader::standard(0x021, 8);
        assert_eq!(header.node_id(), 1);
        assert_eq!(header.command_id(), 1);
    }

    #[test]
    fn test_frame_from_short_data_pads() {
        let frame = BusFrame::from_data(FrameHeader::standard(0x001, 5), &[9, 9, 9, 9, 9]).unwrap();
        assert_eq!(frame.payload, [9, 9, 9, 9, 9, 0, 0, 0]);
        assert!(BusFrame::from_data(FrameHeader::standard(0, 8), &[0; 9]).is_none());
    }
}
