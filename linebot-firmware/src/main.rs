//! Linebot - Line Follower Robot Firmware
//!
//! Main firmware binary for the STM32H723 controller board. `main` is the
//! composition root: it brings the peripherals up, builds the routing
//! table, spawns the receive tasks and runs the boot sequence once. After
//! that it returns and the executor idles between interrupts.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::can::{self, CanConfigurator};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::peripherals::{FDCAN1, I2C1, I2C2, UART7, USART3, USART6};
use embassy_stm32::usart::{self, Uart, UartRx};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use linebot_core::axis::Axes;
use linebot_core::carousel::Carousel;
use linebot_core::config::{RobotConfig, SerialConfig};
use linebot_core::dispatch::{SerialPort, SerialRoute, SerialRouter};
use linebot_core::startup::{Collaborators, Sequencer};
use linebot_drivers::{Hd44780, Mpu6050};

use crate::board::{ControlSignal, CarouselTimer, Links, SineActuator};
use crate::channels::{AXES, CAROUSEL, READINGS};

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    USART3 => usart::InterruptHandler<USART3>;
    UART7 => usart::InterruptHandler<UART7>;
    USART6 => usart::InterruptHandler<USART6>;
    I2C1_EV => i2c::EventInterruptHandler<I2C1>;
    I2C1_ER => i2c::ErrorInterruptHandler<I2C1>;
    I2C2_EV => i2c::EventInterruptHandler<I2C2>;
    I2C2_ER => i2c::ErrorInterruptHandler<I2C2>;
    FDCAN1_IT0 => can::IT0InterruptHandler<FDCAN1>;
    FDCAN1_IT1 => can::IT1InterruptHandler<FDCAN1>;
});

/// Configuration compiled from robot.toml
static CONFIG: RobotConfig = config::ROBOT_CONFIG;

/// Serial routing table, fixed after composition
static ROUTER: StaticCell<SerialRouter> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Linebot firmware starting...");

    let p = embassy_stm32::init(board::clock_config());
    info!("Peripherals initialized");

    let serial = &CONFIG.serial;
    let router = match SerialRouter::with_routes(serial.wired, serial.wireless, serial.position_fix)
    {
        Ok(router) => ROUTER.init(router),
        Err(e) => {
            error!("Serial routing rejected: {:?}", e);
            panic!("invalid serial routing");
        }
    };

    // Serial ports; receive tasks idle until their port is armed
    let usart3 = Uart::new(
        p.USART3,
        p.PD9, // RX
        p.PD8, // TX
        Irqs,
        p.DMA1_CH0,
        p.DMA1_CH1,
        uart_config(serial, SerialPort::Usart3),
    )
    .unwrap();
    let uart7 = Uart::new(
        p.UART7,
        p.PE7, // RX
        p.PE8, // TX
        Irqs,
        p.DMA1_CH2,
        p.DMA1_CH3,
        uart_config(serial, SerialPort::Uart7),
    )
    .unwrap();
    let usart6 = UartRx::new(
        p.USART6,
        Irqs,
        p.PC7, // RX
        p.DMA1_CH4,
        uart_config(serial, SerialPort::Usart6),
    )
    .unwrap();
    info!("Serial ports initialized");

    let (usart3_tx, usart3_rx) = usart3.split();
    let (uart7_tx, uart7_rx) = uart7.split();

    for (port, tx) in [(SerialPort::Usart3, usart3_tx), (SerialPort::Uart7, uart7_tx)] {
        if let Some(SerialRoute::Link(link)) = router.route(port) {
            spawner.spawn(tasks::link_tx_task(link, tx)).unwrap();
        }
    }
    spawner
        .spawn(tasks::serial_rx_task(SerialPort::Usart3, usart3_rx, router))
        .unwrap();
    spawner
        .spawn(tasks::serial_rx_task(SerialPort::Uart7, uart7_rx, router))
        .unwrap();
    spawner
        .spawn(tasks::serial_rx_task(SerialPort::Usart6, usart6, router))
        .unwrap();

    // LCD and IMU on separate I2C buses
    let mut lcd = Hd44780::new(
        I2c::new(
            p.I2C1,
            p.PB8,
            p.PB9,
            Irqs,
            p.DMA1_CH5,
            p.DMA1_CH6,
            i2c::Config::default(),
        ),
        Delay,
    );
    let mut imu = Mpu6050::new(I2c::new(
        p.I2C2,
        p.PF1,
        p.PF0,
        Irqs,
        p.DMA2_CH0,
        p.DMA2_CH1,
        i2c::Config::default(),
    ));

    // Motor bus
    let mut can = CanConfigurator::new(p.FDCAN1, p.PD0, p.PD1, Irqs);
    can.set_bitrate(CONFIG.bus.bitrate);
    let can = can.into_normal_mode();
    AXES.lock(|axes| *axes.borrow_mut() = Axes::with_nodes(CONFIG.bus.node_ids));
    info!("Motor bus at {} bit/s", CONFIG.bus.bitrate);

    spawner.spawn(tasks::bus_rx_task(can)).unwrap();
    spawner
        .spawn(tasks::control_task(CONFIG.control.period_ms))
        .unwrap();

    // Boot sequence
    let mut links = Links::new(router);
    let mut timer = CarouselTimer::new(spawner, CONFIG.display.tick_ms);
    let mut carousel: Carousel<'static> = Carousel::new();

    let boot = Sequencer::new(&CONFIG, &READINGS).run(
        Collaborators {
            display: &mut lcd,
            sensors: &mut imu,
            link: &mut links,
            timer: &mut timer,
            actuator: &mut SineActuator,
            signal: &mut ControlSignal,
        },
        &mut carousel,
        |step| info!("Boot: {:?}", step),
    );
    if let Err(e) = boot {
        error!("Boot failed: {:?}", e);
        panic!("boot failed");
    }

    let messages = carousel.len();
    CAROUSEL.lock(|shared| *shared.borrow_mut() = carousel);

    spawner
        .spawn(tasks::display_task(lcd, CONFIG.display.refresh_ms))
        .unwrap();
    spawner
        .spawn(tasks::sensor_task(imu, CONFIG.sensors.sample_ms))
        .unwrap();

    info!("Boot complete, {} status messages", messages);
}

/// UART settings for the role `port` plays
fn uart_config(serial: &SerialConfig, port: SerialPort) -> usart::Config {
    let mut config = usart::Config::default();
    config.baudrate = board::baud_for(serial, port).unwrap_or(board::FALLBACK_BAUD);
    config
}
