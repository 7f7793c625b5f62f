//! Position-fix sentence decoding
//!
//! The GPS receiver streams NMEA 0183 sentences one byte per receive. Only
//! GGA sentences carry what the robot needs (latitude, longitude, fix
//! quality); everything else is dropped.

use heapless::Vec;

use crate::sensors::GpsReadings;

/// Longest NMEA sentence, including `$` and CR LF
pub const MAX_SENTENCE_LEN: usize = 82;

/// A decoded position fix, in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionFix {
    pub latitude: f32,
    pub longitude: f32,
    /// Number of satellites used
    pub satellites: u8,
}

impl PositionFix {
    /// Store the fix into the shared GPS readings
    pub fn publish(&self, gps: &GpsReadings) {
        gps.latitude.set(self.latitude);
        gps.longitude.set(self.longitude);
    }
}

/// Byte-wise NMEA sentence assembler
#[derive(Debug, Clone, Default)]
pub struct SentenceAssembler {
    buf: Vec<u8, MAX_SENTENCE_LEN>,
    in_sentence: bool,
}

impl SentenceAssembler {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            in_sentence: false,
        }
    }

    /// Feed one received byte
    ///
    /// Returns a fix when `byte` ends a valid GGA sentence with a fix.
    pub fn feed(&mut self, byte: u8) -> Option<PositionFix> {
        match byte {
            b'$' => {
                self.buf.clear();
                self.in_sentence = true;
                None
            }
            b'\r' | b'\n' if self.in_sentence => {
                self.in_sentence = false;
                parse_gga(&self.buf)
            }
            _ if self.in_sentence => {
                if self.buf.push(byte).is_err() {
                    self.in_sentence = false;
                }
                None
            }
            _ => None,
        }
    }
}

/// Parse the body of a GGA sentence (text between `$` and the line end)
pub fn parse_gga(sentence: &[u8]) -> Option<PositionFix> {
    let body = checked_body(sentence)?;
    let body = core::str::from_utf8(body).ok()?;

    let mut fields = body.split(',');
    let talker = fields.next()?;
    if talker.len() != 5 || !talker.ends_with("GGA") {
        return None;
    }

    let _time = fields.next()?;
    let lat = fields.next()?;
    let lat_hemi = fields.next()?;
    let lon = fields.next()?;
    let lon_hemi = fields.next()?;
    let quality: u8 = fields.next()?.parse().ok()?;
    let satellites: u8 = fields.next()?.parse().unwrap_or(0);

    if quality == 0 {
        return None;
    }

    let latitude = signed(degrees(lat, 2)?, lat_hemi, "N", "S")?;
    let longitude = signed(degrees(lon, 3)?, lon_hemi, "E", "W")?;

    Some(PositionFix {
        latitude,
        longitude,
        satellites,
    })
}

/// Strip and verify the `*hh` checksum, when present
fn checked_body(sentence: &[u8]) -> Option<&[u8]> {
    let Some(star) = sentence.iter().position(|&b| b == b'*') else {
        return Some(sentence);
    };

    let (body, tail) = sentence.split_at(star);
    let expected = match tail {
        [b'*', hi, lo] => (hex_digit(*hi)? << 4) | hex_digit(*lo)?,
        _ => return None,
    };
    let actual = body.iter().fold(0u8, |acc, &b| acc ^ b);

    (actual == expected).then_some(body)
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// `ddmm.mmmm` (or `dddmm.mmmm`) to decimal degrees
fn degrees(field: &str, degree_digits: usize) -> Option<f32> {
    let numeric = field.bytes().all(|b| b.is_ascii_digit() || b == b'.');
    if !numeric || field.len() <= degree_digits {
        return None;
    }
    let (deg, min) = field.split_at(degree_digits);
    let deg: f32 = deg.parse().ok()?;
    let min: f32 = min.parse().ok()?;
    Some(deg + min / 60.0)
}

fn signed(value: f32, hemi: &str, positive: &str, negative: &str) -> Option<f32> {
    if hemi == positive {
        Some(value)
    } else if hemi == negative {
        Some(-value)
    } else {
        None
    }
}
