//! Line template formatting
//!
//! Templates are printf-style with a single numeric placeholder:
//! `%f`, `%.Nf`, `%d`/`%i` and `%%`. Output is clipped to one LCD row.

use core::fmt::{self, Write};

use heapless::String;

use crate::traits::LCD_COLS;

/// Characters in one rendered line
pub const LINE_CAPACITY: usize = LCD_COLS;

/// One rendered display line
pub type Line = String<LINE_CAPACITY>;

/// Default precision of `%f`
const DEFAULT_PRECISION: usize = 6;

/// Writer that silently drops everything past the line capacity
struct Clip<'a> {
    out: &'a mut Line,
}

impl Write for Clip<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.out.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Percent,
    Float(usize),
    Int,
}

/// Parse the conversion following a `%`
///
/// Returns the placeholder and the number of bytes it spans after the `%`.
fn parse_placeholder(directive: &[u8]) -> Option<(Placeholder, usize)> {
    match directive {
        [b'%', ..] => Some((Placeholder::Percent, 1)),
        [b'f', ..] => Some((Placeholder::Float(DEFAULT_PRECISION), 1)),
        [b'd' | b'i', ..] => Some((Placeholder::Int, 1)),
        [b'.', b'f', ..] => Some((Placeholder::Float(0), 2)),
        [b'.', digit @ b'0'..=b'9', b'f', ..] => {
            Some((Placeholder::Float((digit - b'0') as usize), 3))
        }
        _ => None,
    }
}

/// Render `template` into `out`, substituting `value` for the placeholder
///
/// With no value, placeholders are copied through verbatim. Anything past
/// [`LINE_CAPACITY`] is dropped.
pub fn render_template(template: &str, value: Option<f32>, out: &mut Line) {
    out.clear();
    let mut clip = Clip { out };
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        let _ = clip.write_str(&rest[..pos]);
        let directive = &rest[pos + 1..];

        let used = match (parse_placeholder(directive.as_bytes()), value) {
            (Some((Placeholder::Percent, used)), _) => {
                let _ = clip.write_char('%');
                used
            }
            (Some((Placeholder::Float(precision), used)), Some(v)) => {
                let _ = write!(clip, "{:.*}", precision, v);
                used
            }
            (Some((Placeholder::Int, used)), Some(v)) => {
                let _ = write!(clip, "{}", v as i32);
                used
            }
            (Some((_, used)), None) => {
                let _ = clip.write_str(&rest[pos..pos + 1 + used]);
                used
            }
            (None, _) => {
                let _ = clip.write_char('%');
                0
            }
        };

        rest = &directive[used..];
    }

    let _ = clip.write_str(rest);
}
