//! Inter-task shared state and signals
//!
//! Everything that crosses a task boundary lives here as a static. State
//! touched from several tasks sits behind a blocking critical-section mutex
//! so each access is short and bounded.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use linebot_core::axis::Axes;
use linebot_core::carousel::Carousel;
use linebot_core::dispatch::{LinkId, SERIAL_PORT_COUNT};
use linebot_core::sensors::{SensorCell, SensorReadings};
use linebot_core::signal::FlagGroup;
use linebot_core::telemetry::Reply;
use linebot_core::traits::SineProfile;

/// Queued telemetry replies per link
const REPLY_QUEUE_LEN: usize = 4;

/// Live sensor values, written by the acquisition paths
pub static READINGS: SensorReadings = SensorReadings::new();

/// Wheel axis state, written by the bus receive task
pub static AXES: Mutex<CriticalSectionRawMutex, RefCell<Axes>> =
    Mutex::new(RefCell::new(Axes::new()));

/// Status messages, advanced by the tick task and drawn by the display task
pub static CAROUSEL: Mutex<CriticalSectionRawMutex, RefCell<Carousel<'static>>> =
    Mutex::new(RefCell::new(Carousel::new()));

/// Control task flag word
pub static CONTROL_FLAGS: FlagGroup = FlagGroup::new();

/// Wakes the control task after a flag was set
pub static CONTROL_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Actuator profile handed to the control task
pub static ACTUATOR_PROFILE: Signal<CriticalSectionRawMutex, SineProfile> = Signal::new();

/// Latest actuator setpoint
pub static SETPOINT: SensorCell = SensorCell::new(0.0);

/// One-byte receive arming, one signal per serial port
pub static RX_ARM: [Signal<CriticalSectionRawMutex, ()>; SERIAL_PORT_COUNT] =
    [const { Signal::new() }; SERIAL_PORT_COUNT];

static WIRED_TX: Channel<CriticalSectionRawMutex, Reply, REPLY_QUEUE_LEN> = Channel::new();
static WIRELESS_TX: Channel<CriticalSectionRawMutex, Reply, REPLY_QUEUE_LEN> = Channel::new();

/// Outgoing reply queue of a link
pub fn reply_queue(link: LinkId) -> &'static Channel<CriticalSectionRawMutex, Reply, REPLY_QUEUE_LEN> {
    match link {
        LinkId::Wired => &WIRED_TX,
        LinkId::Wireless => &WIRELESS_TX,
    }
}
