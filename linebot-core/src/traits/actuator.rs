//! Actuator motion profile

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sinusoidal motion profile
///
/// `setpoint(t) = amplitude * sin(angular_frequency * t + phase) + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SineProfile {
    /// Peak deviation from the offset
    pub amplitude: f32,
    /// Angular frequency in rad per sample
    pub angular_frequency: f32,
    /// Phase in rad
    pub phase: f32,
    /// Constant offset
    pub offset: f32,
}

impl SineProfile {
    /// Profile loaded at boot
    ///
    /// The frequency was tuned with 3.14, not `PI`; keep it.
    #[allow(clippy::approx_constant)]
    pub const BOOT: Self = Self {
        amplitude: 0.1,
        angular_frequency: 8.0 * 3.14 / 181.0,
        phase: 0.0,
        offset: 0.0,
    };

    /// Setpoint at sample `t`
    pub fn sample(&self, t: f32) -> f32 {
        self.amplitude * libm::sinf(self.angular_frequency * t + self.phase) + self.offset
    }
}

impl Default for SineProfile {
    fn default() -> Self {
        Self::BOOT
    }
}

/// Actuator control collaborator
///
/// Parameter validation belongs to the implementation.
pub trait Actuator {
    /// Load a sinusoidal motion profile
    fn configure_sinusoid(&mut self, profile: SineProfile);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_at_zero_is_offset() {
        let profile = SineProfile {
            offset: 0.5,
            ..SineProfile::BOOT
        };
        assert!((profile.sample(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_peaks_at_quarter_period() {
        let profile = SineProfile {
            amplitude: 2.0,
            angular_frequency: 1.0,
            phase: 0.0,
            offset: 0.0,
        };
        let quarter = core::f32::consts::FRAC_PI_2;
        assert!((profile.sample(quarter) - 2.0).abs() < 1e-5);
    }
}
