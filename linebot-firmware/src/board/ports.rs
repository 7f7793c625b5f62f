// Serial ports wired on the controller board
//
// Also pulled into build.rs, which rejects robot.toml roles on any other
// port.

use linebot_core::dispatch::SerialPort;

/// Ports with both directions wired
pub const DUPLEX_PORTS: [SerialPort; 2] = [SerialPort::Usart3, SerialPort::Uart7];

/// Ports with only the receive line wired
pub const RX_ONLY_PORTS: [SerialPort; 1] = [SerialPort::Usart6];
