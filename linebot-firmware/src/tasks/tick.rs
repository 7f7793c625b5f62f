//! Carousel tick task
//!
//! Stands in for the periodic timer interrupt: every period the carousel
//! is advanced by one period of display time.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::CAROUSEL;

/// Tick task - advances the carousel every `period_ms`
#[embassy_executor::task]
pub async fn tick_task(period_ms: u32) {
    info!("Tick task started ({} ms)", period_ms);

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));

    loop {
        ticker.next().await;

        let rotated = CAROUSEL.lock(|carousel| carousel.borrow_mut().advance(period_ms));
        if rotated {
            trace!("Carousel rotated");
        }
    }
}
