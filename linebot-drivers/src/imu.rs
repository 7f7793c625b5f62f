//! MPU-6050 six-axis IMU
//!
//! Accelerometer, gyroscope and die temperature over I2C. The driver runs
//! the sensor at its most sensitive ranges (+-2 g, +-250 deg/s), which is
//! plenty for a ground robot.

use embedded_hal::i2c::I2c;
use linebot_core::sensors::ImuReadings;
use linebot_core::traits::{SensorError, SensorSubsystem};

/// Address with AD0 low
pub const DEFAULT_ADDRESS: u8 = 0x68;

mod reg {
    pub const SMPLRT_DIV: u8 = 0x19;
    pub const CONFIG: u8 = 0x1A;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

const WHO_AM_I_VALUE: u8 = 0x68;
/// Wake up, clock from the X gyro PLL
const PWR_CLK_PLL_X: u8 = 0x01;
/// 44 Hz low-pass on both sensors
const DLPF_44HZ: u8 = 0x03;
/// 1 kHz / (1 + 9) = 100 Hz output rate
const SAMPLE_DIV_100HZ: u8 = 9;

const ACCEL_LSB_PER_G: f32 = 16_384.0;
const GYRO_LSB_PER_DPS: f32 = 131.0;
const STANDARD_GRAVITY: f32 = 9.806_65;

/// Length of the accel..gyro register burst
const BURST_LEN: usize = 14;

/// One converted sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuSample {
    /// m/s^2
    pub accel: [f32; 3],
    /// deg/s
    pub gyro: [f32; 3],
    /// deg C
    pub temperature: f32,
}

impl ImuSample {
    /// Convert a raw register burst starting at ACCEL_XOUT_H
    pub fn from_raw(raw: &[u8; BURST_LEN]) -> Self {
        let word = |i: usize| i16::from_be_bytes([raw[2 * i], raw[2 * i + 1]]) as f32;
        let accel = |i| word(i) / ACCEL_LSB_PER_G * STANDARD_GRAVITY;
        let gyro = |i| word(i) / GYRO_LSB_PER_DPS;

        Self {
            accel: [accel(0), accel(1), accel(2)],
            temperature: word(3) / 340.0 + 36.53,
            gyro: [gyro(4), gyro(5), gyro(6)],
        }
    }

    /// Store the sample into the shared IMU readings
    pub fn publish(&self, imu: &ImuReadings) {
        let [ax, ay, az] = self.accel;
        let [gx, gy, gz] = self.gyro;
        imu.accelerometer.set(ax, ay, az);
        imu.gyroscope.set(gx, gy, gz);
        imu.temperature.set(self.temperature);
    }
}

/// MPU-6050 driver
pub struct Mpu6050<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Mpu6050<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Identity register
    pub fn who_am_i(&mut self) -> Result<u8, SensorError> {
        let mut id = [0u8];
        self.read_regs(reg::WHO_AM_I, &mut id)?;
        Ok(id[0])
    }

    /// Read and convert one sample
    pub fn read(&mut self) -> Result<ImuSample, SensorError> {
        let mut raw = [0u8; BURST_LEN];
        self.read_regs(reg::ACCEL_XOUT_H, &mut raw)?;
        Ok(ImuSample::from_raw(&raw))
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::Bus)
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| SensorError::Bus)
    }
}

impl<I: I2c> SensorSubsystem for Mpu6050<I> {
    fn init(&mut self) -> Result<(), SensorError> {
        if self.who_am_i()? != WHO_AM_I_VALUE {
            return Err(SensorError::ImuNotFound);
        }

        self.write_reg(reg::PWR_MGMT_1, PWR_CLK_PLL_X)?;
        self.write_reg(reg::CONFIG, DLPF_44HZ)?;
        self.write_reg(reg::SMPLRT_DIV, SAMPLE_DIV_100HZ)?;
        self.write_reg(reg::GYRO_CONFIG, 0)?;
        self.write_reg(reg::ACCEL_CONFIG, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use heapless::Vec;
    use linebot_core::sensors::SensorReadings;

    /// Register-file fake: writes land in `regs`, reads come out of it
    struct FakeImu {
        regs: [u8; 0x80],
        writes: Vec<(u8, u8), 16>,
        present: bool,
    }

    impl FakeImu {
        fn new() -> Self {
            let mut regs = [0u8; 0x80];
            regs[reg::WHO_AM_I as usize] = WHO_AM_I_VALUE;
            Self {
                regs,
                writes: Vec::new(),
                present: true,
            }
        }
    }

    impl ErrorType for FakeImu {
        type Error = ErrorKind;
    }

    impl I2c for FakeImu {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if !self.present || address != DEFAULT_ADDRESS {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            let mut pointer = 0usize;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        pointer = bytes[0] as usize;
                        if let [reg, value] = **bytes {
                            self.regs[reg as usize] = value;
                            self.writes.push((reg, value)).unwrap();
                        }
                    }
                    Operation::Read(buf) => {
                        buf.copy_from_slice(&self.regs[pointer..pointer + buf.len()]);
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_configures_ranges() {
        let mut imu = Mpu6050::new(FakeImu::new());
        imu.init().unwrap();
        assert_eq!(
            imu.i2c.writes.as_slice(),
            &[
                (reg::PWR_MGMT_1, PWR_CLK_PLL_X),
                (reg::CONFIG, DLPF_44HZ),
                (reg::SMPLRT_DIV, SAMPLE_DIV_100HZ),
                (reg::GYRO_CONFIG, 0),
                (reg::ACCEL_CONFIG, 0),
            ]
        );
    }

    #[test]
    fn test_init_rejects_wrong_identity() {
        let mut fake = FakeImu::new();
        fake.regs[reg::WHO_AM_I as usize] = 0x70;
        let mut imu = Mpu6050::new(fake);
        assert_eq!(imu.init(), Err(SensorError::ImuNotFound));
        assert!(imu.i2c.writes.is_empty());
    }

    #[test]
    fn test_init_without_device() {
        let mut fake = FakeImu::new();
        fake.present = false;
        assert_eq!(Mpu6050::new(fake).init(), Err(SensorError::Bus));

        let mut wrong_addr = Mpu6050::with_address(FakeImu::new(), 0x69);
        assert_eq!(wrong_addr.init(), Err(SensorError::Bus));
    }

    #[test]
    fn test_sample_conversion() {
        let mut raw = [0u8; BURST_LEN];
        // +1 g on Z
        raw[4..6].copy_from_slice(&16_384i16.to_be_bytes());
        // -1 g on X
        raw[0..2].copy_from_slice(&(-16_384i16).to_be_bytes());
        // 0 deg C is raw -12420
        raw[6..8].copy_from_slice(&(-12_420i16).to_be_bytes());
        // 10 deg/s on gyro Y
        raw[10..12].copy_from_slice(&1_310i16.to_be_bytes());

        let sample = ImuSample::from_raw(&raw);
        assert!((sample.accel[2] - STANDARD_GRAVITY).abs() < 1e-4);
        assert!((sample.accel[0] + STANDARD_GRAVITY).abs() < 1e-4);
        assert!(sample.temperature.abs() < 0.01);
        assert!((sample.gyro[1] - 10.0).abs() < 1e-4);
        assert_eq!(sample.gyro[0], 0.0);
    }

    #[test]
    fn test_read_and_publish() {
        let mut fake = FakeImu::new();
        let z = reg::ACCEL_XOUT_H as usize + 4;
        fake.regs[z..z + 2].copy_from_slice(&8_192i16.to_be_bytes());
        let mut imu = Mpu6050::new(fake);

        let readings = SensorReadings::new();
        imu.read().unwrap().publish(&readings.imu);

        let half_g = STANDARD_GRAVITY / 2.0;
        assert!((readings.imu.accelerometer.z.get() - half_g).abs() < 1e-4);
        assert!((readings.imu.temperature.get() - 36.53).abs() < 1e-4);
    }
}
