//! Serial receive and transmit tasks
//!
//! Each routed port has a receive task that waits until the port is armed,
//! then completes one byte at a time through the routing table. The
//! handler's answer decides whether the next byte is received.

use defmt::*;
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{UartRx, UartTx};

use linebot_core::axis::Axes;
use linebot_core::dispatch::{LinkId, RxAction, SerialHandler, SerialPort, SerialRouter};
use linebot_core::position::SentenceAssembler;
use linebot_core::telemetry::{Reply, TelemetryLink};

use crate::channels::{reply_queue, AXES, READINGS, RX_ARM};

/// Per-port receive state
#[derive(Default)]
struct RxState {
    telemetry: TelemetryLink,
    position: SentenceAssembler,
    reply: Option<(LinkId, Reply)>,
}

/// Upper-layer handlers, bound to the live axis state for one completion
struct RxHandler<'a> {
    state: &'a mut RxState,
    axes: &'a Axes,
}

impl SerialHandler for RxHandler<'_> {
    fn on_link_byte(&mut self, link: LinkId, byte: u8) -> RxAction {
        self.state.reply = self
            .state
            .telemetry
            .on_byte(link, byte, &READINGS, self.axes)
            .map(|reply| (link, reply));
        RxAction::Rearm
    }

    fn on_position_fix_byte(&mut self, byte: u8) -> RxAction {
        if let Some(fix) = self.state.position.feed(byte) {
            fix.publish(&READINGS.gps);
            trace!("Position fix: {} sats", fix.satellites);
        }
        RxAction::Rearm
    }
}

/// Serial receive task - one per routed port
#[embassy_executor::task(pool_size = 3)]
pub async fn serial_rx_task(
    port: SerialPort,
    mut rx: UartRx<'static, Async>,
    router: &'static SerialRouter,
) {
    info!("{:?} RX task started", port);

    let mut state = RxState::default();
    let mut byte = [0u8; 1];

    loop {
        RX_ARM[port as usize].wait().await;
        trace!("{:?} armed", port);

        loop {
            if let Err(e) = rx.read(&mut byte).await {
                warn!("{:?} read error: {:?}", port, e);
                continue;
            }

            let action = AXES.lock(|axes| {
                let axes = axes.borrow();
                let mut handler = RxHandler {
                    state: &mut state,
                    axes: &axes,
                };
                router.dispatch(port, byte[0], &mut handler)
            });

            if let Some((link, reply)) = state.reply.take() {
                if reply_queue(link).try_send(reply).is_err() {
                    warn!("{:?} reply dropped, queue full", link);
                }
            }

            match action {
                Some(RxAction::Rearm) => continue,
                Some(RxAction::Stop) => break,
                None => {
                    warn!("{:?} has no route", port);
                    break;
                }
            }
        }
    }
}

/// Link transmit task - writes queued telemetry replies
#[embassy_executor::task(pool_size = 2)]
pub async fn link_tx_task(link: LinkId, mut tx: UartTx<'static, Async>) {
    info!("{:?} link TX task started", link);

    let queue = reply_queue(link);

    loop {
        let reply = queue.receive().await;
        if let Err(e) = tx.write(reply.as_bytes()).await {
            warn!("{:?} write error: {:?}", link, e);
        }
    }
}
