//! Telemetry request protocol
//!
//! The host tool polls live values over the wired or wireless link, one
//! parameter per request:
//!
//! ```text
//! request:  # g N N ;          e.g. "#g08;"
//! reply:    # a N N : VALUE ; \r   e.g. "#a08:27.5000;\r"
//! ```
//!
//! Requests arrive one byte per receive-complete, so decoding is an
//! incremental state machine over a small fixed buffer.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::axis::Axes;
use crate::dispatch::LinkId;
use crate::sensors::SensorReadings;

/// Request start byte
pub const REQUEST_START: u8 = b'#';
/// Request terminator
pub const REQUEST_END: u8 = b';';
/// Read command
const READ_COMMAND: u8 = b'g';
/// Longest request body between start and terminator
const MAX_REQUEST_BODY: usize = 3;
/// Longest encoded reply
pub const MAX_REPLY_LEN: usize = 32;

/// Encoded reply
pub type Reply = String<MAX_REPLY_LEN>;

/// Readable parameters, by request index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    Latitude,
    Longitude,
    AccelX,
    AccelY,
    AccelZ,
    GyroX,
    GyroY,
    GyroZ,
    Temperature,
    AxisPosition(usize),
    AxisVelocity(usize),
    AxisError(usize),
    AxisState(usize),
    AxisHeartbeats(usize),
}

impl Parameter {
    /// Number of parameter indices
    pub const COUNT: u8 = 19;

    /// Parameter behind a request index
    pub fn from_index(index: u8) -> Option<Self> {
        let param = match index {
            0 => Self::Latitude,
            1 => Self::Longitude,
            2 => Self::AccelX,
            3 => Self::AccelY,
            4 => Self::AccelZ,
            5 => Self::GyroX,
            6 => Self::GyroY,
            7 => Self::GyroZ,
            8 => Self::Temperature,
            9 | 10 => Self::AxisPosition((index - 9) as usize),
            11 | 12 => Self::AxisVelocity((index - 11) as usize),
            13 | 14 => Self::AxisError((index - 13) as usize),
            15 | 16 => Self::AxisState((index - 15) as usize),
            17 | 18 => Self::AxisHeartbeats((index - 17) as usize),
            _ => return None,
        };
        Some(param)
    }

    /// Current value of the parameter
    pub fn read(&self, readings: &SensorReadings, axes: &Axes) -> f32 {
        let imu = &readings.imu;
        match *self {
            Self::Latitude => readings.gps.latitude.get(),
            Self::Longitude => readings.gps.longitude.get(),
            Self::AccelX => imu.accelerometer.x.get(),
            Self::AccelY => imu.accelerometer.y.get(),
            Self::AccelZ => imu.accelerometer.z.get(),
            Self::GyroX => imu.gyroscope.x.get(),
            Self::GyroY => imu.gyroscope.y.get(),
            Self::GyroZ => imu.gyroscope.z.get(),
            Self::Temperature => imu.temperature.get(),
            Self::AxisPosition(i) => axes.get(i).map_or(0.0, |a| a.position),
            Self::AxisVelocity(i) => axes.get(i).map_or(0.0, |a| a.velocity),
            Self::AxisError(i) => axes.get(i).map_or(0.0, |a| a.error as f32),
            Self::AxisState(i) => axes.get(i).map_or(0.0, |a| a.state as f32),
            Self::AxisHeartbeats(i) => axes.get(i).map_or(0.0, |a| a.heartbeats as f32),
        }
    }
}

/// A decoded read request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    /// Requested parameter index
    pub index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for the start byte
    Idle,
    /// Collecting the request body
    Body,
}

/// Incremental request decoder
///
/// Bytes outside a request are ignored. A start byte always restarts
/// decoding, so a corrupted request resynchronises on the next one.
#[derive(Debug, Clone)]
pub struct RequestDecoder {
    state: DecodeState,
    body: Vec<u8, MAX_REQUEST_BODY>,
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDecoder {
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Idle,
            body: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.state = DecodeState::Idle;
        self.body.clear();
    }

    /// Feed one received byte
    ///
    /// Returns a request when `byte` completes a well-formed one.
    pub fn feed(&mut self, byte: u8) -> Option<Request> {
        if byte == REQUEST_START {
            self.reset();
            self.state = DecodeState::Body;
            return None;
        }

        if self.state == DecodeState::Idle {
            return None;
        }

        if byte != REQUEST_END {
            if self.body.push(byte).is_err() {
                self.reset();
            }
            return None;
        }

        let request = Self::parse_body(&self.body);
        self.reset();
        request
    }

    fn parse_body(body: &[u8]) -> Option<Request> {
        match *body {
            [READ_COMMAND, tens @ b'0'..=b'9', ones @ b'0'..=b'9'] => Some(Request {
                index: (tens - b'0') * 10 + (ones - b'0'),
            }),
            _ => None,
        }
    }
}

/// Encode the reply for parameter `index`
pub fn encode_reply(index: u8, value: f32) -> Reply {
    let mut reply = Reply::new();
    if write!(reply, "#a{:02}:{:.4};\r", index, value).is_err() {
        // Too wide for fixed notation; exponent form always fits
        reply.clear();
        let _ = write!(reply, "#a{:02}:{:.4e};\r", index, value);
    }
    reply
}

/// Telemetry endpoint for both communication links
#[derive(Debug, Clone, Default)]
pub struct TelemetryLink {
    wired: RequestDecoder,
    wireless: RequestDecoder,
}

impl TelemetryLink {
    pub const fn new() -> Self {
        Self {
            wired: RequestDecoder::new(),
            wireless: RequestDecoder::new(),
        }
    }

    /// Handle one byte received on `link`
    ///
    /// Returns the reply to send back on the same link, if the byte
    /// completed a request for a known parameter.
    pub fn on_byte(
        &mut self,
        link: LinkId,
        byte: u8,
        readings: &SensorReadings,
        axes: &Axes,
    ) -> Option<Reply> {
        let decoder = match link {
            LinkId::Wired => &mut self.wired,
            LinkId::Wireless => &mut self.wireless,
        };
        let request = decoder.feed(byte)?;
        let parameter = Parameter::from_index(request.index)?;
        Some(encode_reply(request.index, parameter.read(readings, axes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::command;
    use crate::axis::CanSimpleRouter;
    use crate::dispatch::FrameHeader;
    use crate::traits::MotorRouter;

    fn feed_all(decoder: &mut RequestDecoder, bytes: &[u8]) -> Option<Request> {
        let mut last = None;
        for &b in bytes {
            if let Some(req) = decoder.feed(b) {
                last = Some(req);
            }
        }
        last
    }

    #[test]
    fn test_decode_request() {
        let mut decoder = RequestDecoder::new();
        assert_eq!(feed_all(&mut decoder, b"#g08;"), Some(Request { index: 8 }));
        assert_eq!(feed_all(&mut decoder, b"#g18;"), Some(Request { index: 18 }));
    }

    #[test]
    fn test_decode_ignores_noise_and_resyncs() {
        let mut decoder = RequestDecoder::new();
        assert_eq!(feed_all(&mut decoder, b"xx\r\n#g0#g03;"), Some(Request { index: 3 }));
        assert_eq!(feed_all(&mut decoder, b"g04;"), None);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let mut decoder = RequestDecoder::new();
        assert_eq!(feed_all(&mut decoder, b"#s08;"), None);
        assert_eq!(feed_all(&mut decoder, b"#g8;"), None);
        assert_eq!(feed_all(&mut decoder, b"#g0812;"), None);
        assert_eq!(feed_all(&mut decoder, b"#g1a;"), None);
        // Still usable afterwards
        assert_eq!(feed_all(&mut decoder, b"#g01;"), Some(Request { index: 1 }));
    }

    #[test]
    fn test_encode_reply() {
        assert_eq!(encode_reply(8, 27.5).as_str(), "#a08:27.5000;\r");
        assert_eq!(encode_reply(0, -22.8136).as_str(), "#a00:-22.8136;\r");
    }

    #[test]
    fn test_encode_reply_huge_value() {
        let huge = f32::from_bits(0x7F00_0000);
        let reply = encode_reply(9, huge);
        assert!(reply.starts_with("#a09:"));
        assert!(reply.ends_with(";\r"));
        let value: f32 = reply.as_str()["#a09:".len()..reply.len() - 2].parse().unwrap();
        assert!((value - huge).abs() / huge < 1e-4);

        let lowest = encode_reply(99, f32::MIN);
        assert_eq!(lowest.as_str(), "#a99:-3.4028e38;\r");
    }

    #[test]
    fn test_parameter_table() {
        assert_eq!(Parameter::from_index(0), Some(Parameter::Latitude));
        assert_eq!(Parameter::from_index(10), Some(Parameter::AxisPosition(1)));
        assert_eq!(Parameter::from_index(18), Some(Parameter::AxisHeartbeats(1)));
        assert_eq!(Parameter::from_index(Parameter::COUNT), None);
        for index in 0..Parameter::COUNT {
            assert!(Parameter::from_index(index).is_some());
        }
    }

    #[test]
    fn test_link_replies_with_live_values() {
        let readings = SensorReadings::new();
        let mut axes = Axes::new();
        let mut link = TelemetryLink::new();

        readings.imu.temperature.set(31.25);
        let mut payload = [0u8; 8];
        payload[..4].copy_from_slice(&1.5f32.to_le_bytes());
        CanSimpleRouter::new().route(
            &mut axes,
            &FrameHeader::addressed(1, command::ENCODER_ESTIMATES, 8),
            &payload,
        );

        let mut replies: Vec<Reply, 2> = Vec::new();
        for &b in b"#g08;" {
            if let Some(r) = link.on_byte(LinkId::Wired, b, &readings, &axes) {
                replies.push(r).unwrap();
            }
        }
        for &b in b"#g10;" {
            if let Some(r) = link.on_byte(LinkId::Wireless, b, &readings, &axes) {
                replies.push(r).unwrap();
            }
        }

        assert_eq!(replies[0].as_str(), "#a08:31.2500;\r");
        assert_eq!(replies[1].as_str(), "#a10:1.5000;\r");
    }

    #[test]
    fn test_links_decode_independently() {
        let readings = SensorReadings::new();
        let axes = Axes::new();
        let mut link = TelemetryLink::new();

        // Interleaved bytes from both links must not corrupt each other
        let mut got = (None, None);
        for (&w, &b) in b"#g01;".iter().zip(b"#g02;") {
            if let Some(r) = link.on_byte(LinkId::Wired, w, &readings, &axes) {
                got.0 = Some(r);
            }
            if let Some(r) = link.on_byte(LinkId::Wireless, b, &readings, &axes) {
                got.1 = Some(r);
            }
        }

        assert_eq!(got.0.unwrap().as_str(), "#a01:0.0000;\r");
        assert_eq!(got.1.unwrap().as_str(), "#a02:0.0000;\r");
    }

    #[test]
    fn test_unknown_parameter_has_no_reply() {
        let readings = SensorReadings::new();
        let axes = Axes::new();
        let mut link = TelemetryLink::new();
        let mut reply = None;
        for &b in b"#g42;" {
            reply = reply.or(link.on_byte(LinkId::Wired, b, &readings, &axes));
        }
        assert!(reply.is_none());
    }
}
