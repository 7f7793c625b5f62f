//! Control task hand-off: start flag and actuator profile

use linebot_core::signal::{SignalError, TaskFlags, TaskId, TaskSignal};
use linebot_core::traits::{Actuator, SineProfile};

use crate::channels::{ACTUATOR_PROFILE, CONTROL_FLAGS, CONTROL_WAKE};

/// Delivers task flags and wakes the addressed task
pub struct ControlSignal;

impl TaskSignal for ControlSignal {
    fn set_flags(&mut self, task: TaskId, flags: TaskFlags) -> Result<(), SignalError> {
        match task {
            TaskId::Control => {
                CONTROL_FLAGS.set(flags)?;
                CONTROL_WAKE.signal(());
            }
        }
        Ok(())
    }
}

/// Hands the motion profile to the control task
pub struct SineActuator;

impl Actuator for SineActuator {
    fn configure_sinusoid(&mut self, profile: SineProfile) {
        ACTUATOR_PROFILE.signal(profile);
    }
}
