//! Periodic timer trait

/// Errors raised when starting a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Timer already running
    AlreadyRunning,
    /// No resources left to start the timer
    Unavailable,
}

/// Periodic hardware timer
///
/// Each period fires an interrupt that becomes a carousel advance.
pub trait PeriodicTimer {
    /// Start the timer in interrupt mode
    fn start_interrupt(&mut self) -> Result<(), TimerError>;
}
