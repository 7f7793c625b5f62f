//! Board support for the NUCLEO-H723ZG based controller
//!
//! Pin map:
//!
//! | Function            | Peripheral | Pins          |
//! |---------------------|------------|---------------|
//! | Host link (VCP)     | USART3     | PD8 TX, PD9 RX |
//! | Bluetooth bridge    | UART7      | PE8 TX, PE7 RX |
//! | GPS receiver        | USART6     | PC7 RX        |
//! | Status LCD          | I2C1       | PB8 SCL, PB9 SDA |
//! | IMU                 | I2C2       | PF1 SCL, PF0 SDA |
//! | Wheel controllers   | FDCAN1     | PD1 TX, PD0 RX |

pub mod bus;
pub mod control;
pub mod link;
mod ports;
pub mod timer;

pub use bus::{to_bus_frame, Halt, ReceivedFrame};
pub use control::{ControlSignal, SineActuator};
pub use link::Links;
pub use ports::{DUPLEX_PORTS, RX_ONLY_PORTS};
pub use timer::CarouselTimer;

use embassy_stm32::i2c::{I2c, Master};
use embassy_stm32::mode::Async;
use embassy_stm32::time::Hertz;
use embassy_time::Delay;

use linebot_core::config::SerialConfig;
use linebot_core::dispatch::SerialPort;
use linebot_drivers::{Hd44780, Mpu6050};

/// Baud rate used for a board port that has no role
pub const FALLBACK_BAUD: u32 = 115_200;

/// Crystal-less Nucleo: 8 MHz HSE comes from the ST-LINK MCO
const HSE_HZ: u32 = 8_000_000;

pub type BoardI2c = I2c<'static, Async, Master>;
pub type BoardLcd = Hd44780<BoardI2c, Delay>;
pub type BoardImu = Mpu6050<BoardI2c>;

/// Clock tree: default system clock, FDCAN kernel clock from HSE
pub fn clock_config() -> embassy_stm32::Config {
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: Hertz(HSE_HZ),
            mode: HseMode::Bypass,
        });
        config.rcc.mux.fdcansel = mux::Fdcansel::HSE;
    }
    config
}

/// Baud rate of the role assigned to `port`
pub fn baud_for(serial: &SerialConfig, port: SerialPort) -> Option<u32> {
    if port == serial.wired {
        Some(serial.wired_baud)
    } else if port == serial.wireless {
        Some(serial.wireless_baud)
    } else if port == serial.position_fix {
        Some(serial.position_fix_baud)
    } else {
        None
    }
}
