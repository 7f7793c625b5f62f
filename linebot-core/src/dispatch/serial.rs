//! Serial receive-complete routing
//!
//! The hardware delivers every serial receive-complete through a single
//! callback carrying the port that fired. The routing table is filled once
//! at composition time; after that a dispatch is one array lookup.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hardware serial ports of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum SerialPort {
    Usart1 = 0,
    Usart2 = 1,
    Usart3 = 2,
    Uart4 = 3,
    Uart5 = 4,
    Usart6 = 5,
    Uart7 = 6,
    Uart8 = 7,
}

/// Number of serial ports on the controller
pub const SERIAL_PORT_COUNT: usize = 8;

impl SerialPort {
    /// Every port, in table order
    pub const ALL: [SerialPort; SERIAL_PORT_COUNT] = [
        SerialPort::Usart1,
        SerialPort::Usart2,
        SerialPort::Usart3,
        SerialPort::Uart4,
        SerialPort::Uart5,
        SerialPort::Usart6,
        SerialPort::Uart7,
        SerialPort::Uart8,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// Logical endpoint of the communication layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkId {
    /// Cable to the host
    Wired,
    /// Bluetooth bridge
    Wireless,
}

/// Upper-layer destination of a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialRoute {
    /// Communication layer endpoint
    Link(LinkId),
    /// Position-fix (GPS) receiver
    PositionFix,
}

/// What the receive path does after a completion
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxAction {
    /// Arm the next one-byte receive
    Rearm,
    /// Leave the port idle
    Stop,
}

/// Routing table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteError {
    /// Port already has a route
    AlreadyBound(SerialPort),
}

/// Upper-layer serial handlers
///
/// Both callbacks run in interrupt context and must not block.
pub trait SerialHandler {
    /// A byte arrived on a communication link
    fn on_link_byte(&mut self, link: LinkId, byte: u8) -> RxAction;

    /// A byte arrived from the position-fix receiver
    fn on_position_fix_byte(&mut self, byte: u8) -> RxAction;
}

/// Serial dispatch router
#[derive(Debug, Clone)]
pub struct SerialRouter {
    table: [Option<SerialRoute>; SERIAL_PORT_COUNT],
}

impl Default for SerialRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialRouter {
    /// Create a router with no routes
    pub const fn new() -> Self {
        Self {
            table: [None; SERIAL_PORT_COUNT],
        }
    }

    /// Router for the standard wiring: two links plus the position fix
    pub fn with_routes(
        wired: SerialPort,
        wireless: SerialPort,
        position_fix: SerialPort,
    ) -> Result<Self, RouteError> {
        let mut router = Self::new();
        router.bind(wired, SerialRoute::Link(LinkId::Wired))?;
        router.bind(wireless, SerialRoute::Link(LinkId::Wireless))?;
        router.bind(position_fix, SerialRoute::PositionFix)?;
        Ok(router)
    }

    /// Assign a route to a port
    pub fn bind(&mut self, port: SerialPort, route: SerialRoute) -> Result<(), RouteError> {
        let slot = &mut self.table[port.index()];
        if slot.is_some() {
            return Err(RouteError::AlreadyBound(port));
        }
        *slot = Some(route);
        Ok(())
    }

    /// Route currently assigned to a port
    #[inline]
    pub fn route(&self, port: SerialPort) -> Option<SerialRoute> {
        self.table[port.index()]
    }

    /// Ports that have a route, in table order
    pub fn bound_ports(&self) -> impl Iterator<Item = SerialPort> + '_ {
        SerialPort::ALL
            .into_iter()
            .filter(move |port| self.table[port.index()].is_some())
    }

    /// Dispatch a receive-complete
    ///
    /// Returns `None` when the port has no route; unrelated ports may share
    /// the hardware callback and are ignored without error.
    pub fn dispatch<H: SerialHandler>(
        &self,
        port: SerialPort,
        byte: u8,
        handler: &mut H,
    ) -> Option<RxAction> {
        match self.route(port)? {
            SerialRoute::Link(link) => Some(handler.on_link_byte(link, byte)),
            SerialRoute::PositionFix => Some(handler.on_position_fix_byte(byte)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Link(LinkId, u8),
        Fix(u8),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call, 8>,
        answer_stop: bool,
    }

    impl Recorder {
        fn answer(&self) -> RxAction {
            if self.answer_stop {
                RxAction::Stop
            } else {
                RxAction::Rearm
            }
        }
    }

    impl SerialHandler for Recorder {
        fn on_link_byte(&mut self, link: LinkId, byte: u8) -> RxAction {
            self.calls.push(Call::Link(link, byte)).unwrap();
            self.answer()
        }

        fn on_position_fix_byte(&mut self, byte: u8) -> RxAction {
            self.calls.push(Call::Fix(byte)).unwrap();
            self.answer()
        }
    }

    fn robot_router() -> SerialRouter {
        SerialRouter::with_routes(SerialPort::Usart3, SerialPort::Uart7, SerialPort::Usart6)
            .unwrap()
    }

    #[test]
    fn test_link_ports_reach_link_handler() {
        let router = robot_router();
        let mut rec = Recorder::default();

        assert_eq!(
            router.dispatch(SerialPort::Usart3, b'#', &mut rec),
            Some(RxAction::Rearm)
        );
        assert_eq!(
            router.dispatch(SerialPort::Uart7, b'g', &mut rec),
            Some(RxAction::Rearm)
        );

        assert_eq!(
            rec.calls.as_slice(),
            &[
                Call::Link(LinkId::Wired, b'#'),
                Call::Link(LinkId::Wireless, b'g')
            ]
        );
    }

    #[test]
    fn test_position_fix_port_reaches_fix_handler() {
        let router = robot_router();
        let mut rec = Recorder::default();

        let _ = router.dispatch(SerialPort::Usart6, b'$', &mut rec);
        assert_eq!(rec.calls.as_slice(), &[Call::Fix(b'$')]);
    }

    #[test]
    fn test_unrouted_port_is_ignored() {
        let router = robot_router();
        let mut rec = Recorder::default();

        assert_eq!(router.dispatch(SerialPort::Usart1, 0x55, &mut rec), None);
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn test_handler_decides_rearm() {
        let router = robot_router();
        let mut rec = Recorder {
            answer_stop: true,
            ..Default::default()
        };
        assert_eq!(
            router.dispatch(SerialPort::Usart3, 0, &mut rec),
            Some(RxAction::Stop)
        );
    }

    #[test]
    fn test_double_bind_rejected() {
        let mut router = SerialRouter::new();
        router
            .bind(SerialPort::Uart4, SerialRoute::PositionFix)
            .unwrap();
        assert_eq!(
            router.bind(SerialPort::Uart4, SerialRoute::Link(LinkId::Wired)),
            Err(RouteError::AlreadyBound(SerialPort::Uart4))
        );
        assert!(matches!(
            SerialRouter::with_routes(SerialPort::Uart4, SerialPort::Uart4, SerialPort::Uart5),
            Err(RouteError::AlreadyBound(SerialPort::Uart4))
        ));
    }

    #[test]
    fn test_bound_ports() {
        let router = robot_router();
        let mut ports: Vec<SerialPort, 8> = Vec::new();
        for port in router.bound_ports() {
            ports.push(port).unwrap();
        }
        assert_eq!(
            ports.as_slice(),
            &[SerialPort::Usart3, SerialPort::Usart6, SerialPort::Uart7]
        );
    }

    proptest! {
        #[test]
        fn prop_dispatch_depends_only_on_port(idx in 0usize..SERIAL_PORT_COUNT, byte in any::<u8>()) {
            let router = robot_router();
            let port = SerialPort::ALL[idx];
            let mut rec = Recorder::default();

            let outcome = router.dispatch(port, byte, &mut rec);

            match port {
                SerialPort::Usart3 => prop_assert_eq!(rec.calls.as_slice(), &[Call::Link(LinkId::Wired, byte)]),
                SerialPort::Uart7 => prop_assert_eq!(rec.calls.as_slice(), &[Call::Link(LinkId::Wireless, byte)]),
                SerialPort::Usart6 => prop_assert_eq!(rec.calls.as_slice(), &[Call::Fix(byte)]),
                _ => {
                    prop_assert!(outcome.is_none());
                    prop_assert!(rec.calls.is_empty());
                }
            }
        }
    }
}
