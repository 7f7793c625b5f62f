//! LCD refresh task

use defmt::*;
use embassy_time::{Duration, Ticker};

use linebot_core::traits::{DisplayError, DisplayExt};

use crate::board::BoardLcd;
use crate::channels::CAROUSEL;

/// Display task - redraws the current carousel message
///
/// Rendering happens under the carousel lock; the slow I2C writes do not.
#[embassy_executor::task]
pub async fn display_task(mut lcd: BoardLcd, refresh_ms: u32) {
    info!("Display task started");

    let mut ticker = Ticker::every(Duration::from_millis(refresh_ms as u64));

    loop {
        ticker.next().await;

        let Some(message) = CAROUSEL.lock(|carousel| carousel.borrow().render()) else {
            continue;
        };

        let drawn: Result<(), DisplayError> = lcd
            .draw_line(0, &message.first)
            .and_then(|()| lcd.draw_line(1, &message.second));
        if let Err(e) = drawn {
            warn!("LCD update failed: {:?}", e);
        }
    }
}
