//! Build script for linebot-firmware
//!
//! - Passes the cortex-m-rt and defmt linker scripts
//! - Validates robot.toml at compile time
//! - Generates the `ROBOT_CONFIG` constant from it

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use linebot_core::config::{ConfigError, RobotConfig};

// Board wiring, shared with the firmware's board module
include!("src/board/ports.rs");

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Linker scripts; memory.x comes from embassy-stm32's `memory-x` feature
fn setup_linker() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, validate and merge robot.toml over the stock configuration
fn load_config() -> RobotConfig {
    println!("cargo:rerun-if-changed=robot.toml");

    let config_path = Path::new("robot.toml");
    if !config_path.exists() {
        fail(
            "robot.toml not found!",
            &["The firmware requires a robot.toml configuration file.".into()],
        );
    }

    let content = fs::read_to_string(config_path)
        .unwrap_or_else(|e| fail("Failed to read robot.toml", &[e.to_string()]));

    let value: toml::Value = toml::from_str(&content)
        .unwrap_or_else(|e| fail("Invalid TOML syntax in robot.toml", &error_lines(&e.to_string())));

    let mut errors = Vec::new();
    let mut config = RobotConfig::default_config();
    apply_serial(&value, &mut config, &mut errors);
    apply_bus(&value, &mut config, &mut errors);
    apply_display(&value, &mut config, &mut errors);
    apply_sensors(&value, &mut config, &mut errors);
    apply_control(&value, &mut config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in robot.toml", &errors);
    }

    if let Err(e) = config.validate() {
        fail("Inconsistent robot.toml", &[describe(e)]);
    }
    if let Err(e) = config.serial.check_wiring(&DUPLEX_PORTS, &RX_ONLY_PORTS) {
        fail("robot.toml names an unwired port", &[describe(e)]);
    }

    println!("cargo:warning=robot.toml validated successfully");
    config
}

fn section<'a>(value: &'a toml::Value, name: &str) -> Option<&'a toml::Table> {
    value.get(name).and_then(toml::Value::as_table)
}

fn read_u32(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) -> Option<u32> {
    let raw = table.get(key)?;
    match raw.as_integer().map(u32::try_from) {
        Some(Ok(n)) => Some(n),
        _ => {
            errors.push(format!("[{}] {} must be a non-negative integer", section, key));
            None
        }
    }
}

fn read_f32(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) -> Option<f32> {
    let raw = table.get(key)?;
    let number = raw.as_float().or_else(|| raw.as_integer().map(|i| i as f64));
    match number {
        Some(x) if x.is_finite() => Some(x as f32),
        _ => {
            errors.push(format!("[{}] {} must be a finite number", section, key));
            None
        }
    }
}

fn read_port(table: &toml::Table, key: &str, errors: &mut Vec<String>) -> Option<SerialPort> {
    let raw = table.get(key)?;
    let name = raw.as_str().unwrap_or_default().to_ascii_lowercase();
    let port = SerialPort::ALL
        .into_iter()
        .find(|port| format!("{:?}", port).to_ascii_lowercase() == name);
    if port.is_none() {
        errors.push(format!("[serial] {} must name a port (usart1..uart8)", key));
    }
    port
}

fn apply_serial(value: &toml::Value, config: &mut RobotConfig, errors: &mut Vec<String>) {
    let Some(t) = section(value, "serial") else {
        return;
    };
    let serial = &mut config.serial;
    if let Some(p) = read_port(t, "wired", errors) {
        serial.wired = p;
    }
    if let Some(p) = read_port(t, "wireless", errors) {
        serial.wireless = p;
    }
    if let Some(p) = read_port(t, "position_fix", errors) {
        serial.position_fix = p;
    }
    if let Some(b) = read_u32(t, "serial", "wired_baud", errors) {
        serial.wired_baud = b;
    }
    if let Some(b) = read_u32(t, "serial", "wireless_baud", errors) {
        serial.wireless_baud = b;
    }
    if let Some(b) = read_u32(t, "serial", "position_fix_baud", errors) {
        serial.position_fix_baud = b;
    }
}

fn apply_bus(value: &toml::Value, config: &mut RobotConfig, errors: &mut Vec<String>) {
    let Some(t) = section(value, "bus") else {
        return;
    };
    if let Some(b) = read_u32(t, "bus", "bitrate", errors) {
        config.bus.bitrate = b;
    }
    if let Some(raw) = t.get("node_ids") {
        let ids: Option<Vec<u8>> = raw.as_array().and_then(|a| {
            a.iter()
                .map(|v| v.as_integer().and_then(|i| u8::try_from(i).ok()))
                .collect()
        });
        match ids.as_deref() {
            Some(&[left, right]) => config.bus.node_ids = [left, right],
            _ => errors.push("[bus] node_ids must be two ids, e.g. [0, 1]".into()),
        }
    }
}

fn apply_display(value: &toml::Value, config: &mut RobotConfig, errors: &mut Vec<String>) {
    let Some(t) = section(value, "display") else {
        return;
    };
    let display = &mut config.display;
    if let Some(v) = read_u32(t, "display", "tick_ms", errors) {
        display.tick_ms = v;
    }
    if let Some(v) = read_u32(t, "display", "message_ms", errors) {
        display.message_ms = v;
    }
    if let Some(v) = read_u32(t, "display", "refresh_ms", errors) {
        display.refresh_ms = v;
    }
}

fn apply_sensors(value: &toml::Value, config: &mut RobotConfig, errors: &mut Vec<String>) {
    let Some(t) = section(value, "sensors") else {
        return;
    };
    if let Some(v) = read_u32(t, "sensors", "sample_ms", errors) {
        config.sensors.sample_ms = v;
    }
}

fn apply_control(value: &toml::Value, config: &mut RobotConfig, errors: &mut Vec<String>) {
    let Some(t) = section(value, "control") else {
        return;
    };
    if let Some(v) = read_u32(t, "control", "period_ms", errors) {
        config.control.period_ms = v;
    }

    let Some(p) = t.get("profile").and_then(toml::Value::as_table) else {
        return;
    };
    let profile = &mut config.control.profile;
    let name = "control.profile";
    if let Some(v) = read_f32(p, name, "amplitude", errors) {
        profile.amplitude = v;
    }
    if let Some(v) = read_f32(p, name, "angular_frequency", errors) {
        profile.angular_frequency = v;
    }
    if let Some(v) = read_f32(p, name, "phase", errors) {
        profile.phase = v;
    }
    if let Some(v) = read_f32(p, name, "offset", errors) {
        profile.offset = v;
    }
}

fn describe(error: ConfigError) -> String {
    match error {
        ConfigError::SharedSerialPort(port) => {
            format!("serial port {:?} is assigned to two roles", port)
        }
        ConfigError::InvalidBaudRate => "baud rates must be non-zero".into(),
        ConfigError::UnsupportedBitrate(b) => {
            format!("bus bitrate {} unsupported (125k, 250k, 500k, 1M)", b)
        }
        ConfigError::InvalidNodeId(id) => format!("node id {} out of range or duplicated", id),
        ConfigError::ZeroPeriod => "periods must be at least 1 ms".into(),
        ConfigError::MessageShorterThanTick => "message_ms must be >= tick_ms".into(),
        ConfigError::UnwiredPort(port) => format!(
            "{:?} is not wired for that role (duplex: {:?}, rx only: {:?})",
            port, DUPLEX_PORTS, RX_ONLY_PORTS
        ),
    }
}

/// Write `robot_config.rs` into OUT_DIR
fn generate_config(config: &RobotConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let s = &config.serial;
    let p = &config.control.profile;
    let [left, right] = config.bus.node_ids;

    let code = format!(
        "/// Robot configuration compiled from robot.toml\n\
         pub const ROBOT_CONFIG: RobotConfig = RobotConfig {{\n    \
             serial: SerialConfig {{\n        \
                 wired: SerialPort::{:?},\n        \
                 wireless: SerialPort::{:?},\n        \
                 position_fix: SerialPort::{:?},\n        \
                 wired_baud: {},\n        \
                 wireless_baud: {},\n        \
                 position_fix_baud: {},\n    \
             }},\n    \
             bus: BusConfig {{ bitrate: {}, node_ids: [{}, {}] }},\n    \
             display: DisplayConfig {{ tick_ms: {}, message_ms: {}, refresh_ms: {} }},\n    \
             sensors: SensorConfig {{ sample_ms: {} }},\n    \
             control: ControlConfig {{\n        \
                 period_ms: {},\n        \
                 profile: SineProfile {{ amplitude: {:?}, angular_frequency: {:?}, phase: {:?}, offset: {:?} }},\n    \
             }},\n\
         }};\n",
        s.wired,
        s.wireless,
        s.position_fix,
        s.wired_baud,
        s.wireless_baud,
        s.position_fix_baud,
        config.bus.bitrate,
        left,
        right,
        config.display.tick_ms,
        config.display.message_ms,
        config.display.refresh_ms,
        config.sensors.sample_ms,
        config.control.period_ms,
        p.amplitude,
        p.angular_frequency,
        p.phase,
        p.offset,
    );

    fs::write(out_dir.join("robot_config.rs"), code)
        .unwrap_or_else(|e| fail("Failed to write robot_config.rs", &[e.to_string()]));
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Split and clip a multi-line error message to the box width
fn error_lines(msg: &str) -> Vec<String> {
    msg.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            }
        })
        .collect()
}
