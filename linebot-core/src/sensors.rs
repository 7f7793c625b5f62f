//! Shared sensor state
//!
//! Live values written by the sensor and communication layers and read by
//! the display carousel and the telemetry link. Each value is a single
//! atomic scalar: readers may observe a value mid-update of its neighbours,
//! which is acceptable because no consumer needs a consistent multi-field
//! snapshot.

use portable_atomic::{AtomicF32, Ordering};

/// A single live sensor value
///
/// Cells are shared by reference (`&'static SensorCell` on the target).
/// Writers call [`SensorCell::set`], readers call [`SensorCell::get`] at the
/// moment they need the value.
#[derive(Debug)]
pub struct SensorCell(AtomicF32);

impl SensorCell {
    /// Create a cell holding `value`
    pub const fn new(value: f32) -> Self {
        Self(AtomicF32::new(value))
    }

    /// Current value
    #[inline]
    pub fn get(&self) -> f32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Publish a new value
    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value, Ordering::Relaxed);
    }
}

impl Default for SensorCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Three-axis vector of live values
#[derive(Debug, Default)]
pub struct Vector3Cells {
    pub x: SensorCell,
    pub y: SensorCell,
    pub z: SensorCell,
}

impl Vector3Cells {
    pub const fn new() -> Self {
        Self {
            x: SensorCell::new(0.0),
            y: SensorCell::new(0.0),
            z: SensorCell::new(0.0),
        }
    }

    /// Publish all three axes
    pub fn set(&self, x: f32, y: f32, z: f32) {
        self.x.set(x);
        self.y.set(y);
        self.z.set(z);
    }
}

/// Position fix from the GPS receiver
#[derive(Debug, Default)]
pub struct GpsReadings {
    /// Latitude in decimal degrees
    pub latitude: SensorCell,
    /// Longitude in decimal degrees
    pub longitude: SensorCell,
}

impl GpsReadings {
    pub const fn new() -> Self {
        Self {
            latitude: SensorCell::new(0.0),
            longitude: SensorCell::new(0.0),
        }
    }
}

/// Inertial measurement unit readings
#[derive(Debug, Default)]
pub struct ImuReadings {
    /// Linear acceleration (m/s²)
    pub accelerometer: Vector3Cells,
    /// Angular rate (deg/s)
    pub gyroscope: Vector3Cells,
    /// Die temperature (°C)
    pub temperature: SensorCell,
}

impl ImuReadings {
    pub const fn new() -> Self {
        Self {
            accelerometer: Vector3Cells::new(),
            gyroscope: Vector3Cells::new(),
            temperature: SensorCell::new(0.0),
        }
    }
}

/// All live sensor values of the robot
///
/// Owned by the composition root (a `static` on the target) and handed out
/// by shared reference. Nothing in this crate writes to it except through
/// the cells' own `set`.
#[derive(Debug, Default)]
pub struct SensorReadings {
    pub gps: GpsReadings,
    pub imu: ImuReadings,
}

impl SensorReadings {
    /// All readings zeroed, usable in a `static` initializer
    pub const fn new() -> Self {
        Self {
            gps: GpsReadings::new(),
            imu: ImuReadings::new(),
        }
    }
}
