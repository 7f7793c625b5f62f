//! Task signal bridge
//!
//! One-shot flag delivery from the boot sequence to other tasks. Each task
//! owns a 32-bit flag word; a flag is set once per boot and consumed by the
//! task's own wait primitive. Only bit 0 is assigned today, the rest of the
//! word is free for unrelated signals.

use portable_atomic::{AtomicU32, Ordering};

/// Set of task flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskFlags(u32);

impl TaskFlags {
    /// Boot finished; the control loop may start
    pub const CONTROL_START: Self = Self(0b1);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Tasks that can be signalled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    /// Motor control loop
    Control,
}

/// Signalling errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalError {
    /// Every requested flag was already delivered this boot
    AlreadySet(TaskFlags),
    /// No flags requested
    Empty,
}

/// Flag delivery to a task
pub trait TaskSignal {
    /// Deliver `flags` to `task`
    fn set_flags(&mut self, task: TaskId, flags: TaskFlags) -> Result<(), SignalError>;
}

/// Set-once flag word
///
/// Lock-free; `set` may be called from any context. A flag that was already
/// set this boot is not delivered again.
#[derive(Debug, Default)]
pub struct FlagGroup {
    pending: AtomicU32,
    delivered: AtomicU32,
}

impl FlagGroup {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
            delivered: AtomicU32::new(0),
        }
    }

    /// Set flags that have not been delivered yet
    ///
    /// Returns the flags that were newly set.
    pub fn set(&self, flags: TaskFlags) -> Result<TaskFlags, SignalError> {
        if flags.is_empty() {
            return Err(SignalError::Empty);
        }

        let before = self.delivered.fetch_or(flags.bits(), Ordering::AcqRel);
        let fresh = flags.bits() & !before;
        if fresh == 0 {
            return Err(SignalError::AlreadySet(flags));
        }

        self.pending.fetch_or(fresh, Ordering::Release);
        Ok(TaskFlags(fresh))
    }

    /// Consume the pending flags selected by `mask`
    pub fn take(&self, mask: TaskFlags) -> TaskFlags {
        TaskFlags(self.pending.fetch_and(!mask.bits(), Ordering::AcqRel) & mask.bits())
    }

    /// Pending flags, without consuming them
    pub fn pending(&self) -> TaskFlags {
        TaskFlags(self.pending.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_take() {
        let group = FlagGroup::new();
        assert_eq!(group.set(TaskFlags::CONTROL_START), Ok(TaskFlags::CONTROL_START));
        assert!(group.pending().contains(TaskFlags::CONTROL_START));

        assert_eq!(group.take(TaskFlags::CONTROL_START), TaskFlags::CONTROL_START);
        assert!(group.pending().is_empty());
        assert!(group.take(TaskFlags::CONTROL_START).is_empty());
    }

    #[test]
    fn test_delivered_once() {
        let group = FlagGroup::new();
        group.set(TaskFlags::CONTROL_START).unwrap();
        let _ = group.take(TaskFlags::CONTROL_START);

        assert_eq!(
            group.set(TaskFlags::CONTROL_START),
            Err(SignalError::AlreadySet(TaskFlags::CONTROL_START))
        );
        assert!(group.pending().is_empty());
    }

    #[test]
    fn test_independent_flags() {
        let group = FlagGroup::new();
        let other = TaskFlags::from_bits(0b100);
        group.set(TaskFlags::CONTROL_START).unwrap();
        group.set(other).unwrap();

        assert_eq!(group.take(other), other);
        assert!(group.pending().contains(TaskFlags::CONTROL_START));
    }

    #[test]
    fn test_partial_overlap_delivers_fresh_bits() {
        let group = FlagGroup::new();
        group.set(TaskFlags::CONTROL_START).unwrap();
        assert_eq!(group.set(TaskFlags::from_bits(0b11)), Ok(TaskFlags::from_bits(0b10)));
    }

    #[test]
    fn test_empty_rejected() {
        let group = FlagGroup::new();
        assert_eq!(group.set(TaskFlags::empty()), Err(SignalError::Empty));
    }
}
