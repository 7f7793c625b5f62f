//! IMU acquisition task

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::board::BoardImu;
use crate::channels::READINGS;

/// Sensor task - publishes a fresh IMU sample every `sample_ms`
#[embassy_executor::task]
pub async fn sensor_task(mut imu: BoardImu, sample_ms: u32) {
    info!("Sensor task started ({} ms)", sample_ms);

    let mut ticker = Ticker::every(Duration::from_millis(sample_ms as u64));
    let mut failures: u32 = 0;

    loop {
        ticker.next().await;

        match imu.read() {
            Ok(sample) => {
                sample.publish(&READINGS.imu);
                failures = 0;
            }
            Err(e) => {
                // Log the first failure of a run only
                if failures == 0 {
                    warn!("IMU read failed: {:?}", e);
                }
                failures = failures.saturating_add(1);
            }
        }
    }
}
