//! Motor bus receive task

use defmt::*;
use embassy_stm32::can::Can;

use linebot_core::axis::CanSimpleRouter;
use linebot_core::dispatch::{BusDispatch, BusDispatcher, RxFifo, RxFifoFlags};

use crate::board::{to_bus_frame, Halt, ReceivedFrame};
use crate::channels::AXES;

/// Bus receive task - routes wheel controller frames into the axis state
#[embassy_executor::task]
pub async fn bus_rx_task(mut can: Can<'static>) {
    info!("Bus RX task started");

    let mut dispatcher = BusDispatcher::new(RxFifo::Fifo0);
    let mut router = CanSimpleRouter::new();

    loop {
        let envelope = match can.read().await {
            Ok(envelope) => envelope,
            Err(e) => {
                // Error-state changes, not lost frames
                warn!("Bus error: {:?}", e);
                continue;
            }
        };

        let mut frame = ReceivedFrame::new(to_bus_frame(&envelope.frame));
        let outcome = AXES.lock(|axes| {
            dispatcher.on_notification(
                RxFifoFlags::NEW_MESSAGE,
                &mut frame,
                &mut router,
                &mut axes.borrow_mut(),
                &mut Halt,
            )
        });

        if let BusDispatch::Routed(header) = outcome {
            trace!(
                "Frame node={} cmd={:#x}",
                header.node_id(),
                header.command_id()
            );
        }
    }
}
