//! Carousel timer

use embassy_executor::Spawner;

use linebot_core::traits::{PeriodicTimer, TimerError};

use crate::tasks::tick_task;

/// Periodic carousel tick, backed by the tick task
pub struct CarouselTimer {
    spawner: Spawner,
    period_ms: u32,
    running: bool,
}

impl CarouselTimer {
    pub fn new(spawner: Spawner, period_ms: u32) -> Self {
        Self {
            spawner,
            period_ms,
            running: false,
        }
    }
}

impl PeriodicTimer for CarouselTimer {
    fn start_interrupt(&mut self) -> Result<(), TimerError> {
        if self.running {
            return Err(TimerError::AlreadyRunning);
        }
        self.spawner
            .spawn(tick_task(self.period_ms))
            .map_err(|_| TimerError::Unavailable)?;
        self.running = true;
        Ok(())
    }
}
