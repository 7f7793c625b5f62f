//! Actuator control task
//!
//! Blocks until boot releases it, then plays the sine profile at a fixed
//! period. The setpoint is published for the motor control law, which is
//! not part of this firmware.

use defmt::*;
use embassy_time::{Duration, Ticker};

use linebot_core::signal::TaskFlags;

use crate::channels::{ACTUATOR_PROFILE, CONTROL_FLAGS, CONTROL_WAKE, SETPOINT};

#[embassy_executor::task]
pub async fn control_task(period_ms: u32) {
    info!("Control task waiting for start flag");

    while CONTROL_FLAGS.take(TaskFlags::CONTROL_START).is_empty() {
        CONTROL_WAKE.wait().await;
    }

    let mut profile = ACTUATOR_PROFILE.wait().await;
    info!("Control loop running: {:?}", profile);

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));
    let mut t: u32 = 0;

    loop {
        ticker.next().await;

        if let Some(update) = ACTUATOR_PROFILE.try_take() {
            debug!("Actuator profile updated: {:?}", update);
            profile = update;
            t = 0;
        }

        SETPOINT.set(profile.sample(t as f32));
        t = t.wrapping_add(1);
    }
}
