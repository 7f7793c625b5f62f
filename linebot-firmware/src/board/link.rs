//! Communication layer: link endpoints and receive arming

use defmt::*;

use linebot_core::dispatch::{LinkId, SerialPort, SerialRoute, SerialRouter};
use linebot_core::traits::{CommLink, LinkError, SerialReceiver};

use super::{DUPLEX_PORTS, RX_ONLY_PORTS};
use crate::channels::RX_ARM;

/// Only single-byte receives are armed; requests are decoded byte by byte
const RX_LEN: usize = 1;

/// Serial links of the board
///
/// Arming a port wakes its receive task, which then completes one byte at
/// a time through the routing table.
pub struct Links {
    router: &'static SerialRouter,
}

impl Links {
    pub fn new(router: &'static SerialRouter) -> Self {
        Self { router }
    }

    fn check_endpoint(&self, port: SerialPort, link: LinkId) -> Result<(), LinkError> {
        if !DUPLEX_PORTS.contains(&port) {
            return Err(LinkError::NoSuchPort);
        }
        if self.router.route(port) != Some(SerialRoute::Link(link)) {
            return Err(LinkError::Config);
        }
        Ok(())
    }
}

impl CommLink for Links {
    fn init(&mut self, wired: SerialPort, wireless: SerialPort) -> Result<(), LinkError> {
        if wired == wireless {
            return Err(LinkError::DuplicateEndpoint);
        }
        self.check_endpoint(wired, LinkId::Wired)?;
        self.check_endpoint(wireless, LinkId::Wireless)?;

        self.receive_async(wired, RX_LEN)?;
        self.receive_async(wireless, RX_LEN)?;
        debug!("Links up: wired={:?} wireless={:?}", wired, wireless);
        Ok(())
    }
}

impl SerialReceiver for Links {
    fn receive_async(&mut self, port: SerialPort, len: usize) -> Result<(), LinkError> {
        if len != RX_LEN {
            return Err(LinkError::Config);
        }
        if !DUPLEX_PORTS.contains(&port) && !RX_ONLY_PORTS.contains(&port) {
            return Err(LinkError::NoSuchPort);
        }
        if self.router.route(port).is_none() {
            return Err(LinkError::Config);
        }

        let arm = &RX_ARM[port as usize];
        if arm.signaled() {
            return Err(LinkError::Busy);
        }
        arm.signal(());
        Ok(())
    }
}
