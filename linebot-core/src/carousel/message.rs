//! Carousel display messages

use crate::sensors::SensorCell;

use super::format::{render_template, Line};

/// One line of a display message
///
/// A bound line reads its cell at render time, never at construction, so
/// the text always reflects the latest published value.
#[derive(Debug, Clone, Copy)]
pub struct LineSpec<'a> {
    /// printf-style template
    pub template: &'static str,
    /// Live value substituted into the template
    pub binding: Option<&'a SensorCell>,
}

impl<'a> LineSpec<'a> {
    /// Static text line
    pub const fn text(template: &'static str) -> Self {
        Self {
            template,
            binding: None,
        }
    }

    /// Line showing a live value
    pub const fn value(template: &'static str, cell: &'a SensorCell) -> Self {
        Self {
            template,
            binding: Some(cell),
        }
    }

    /// Empty line
    pub const fn blank() -> Self {
        Self::text("")
    }

    /// Whether a live value is bound
    pub const fn has_value(&self) -> bool {
        self.binding.is_some()
    }

    fn render_into(&self, out: &mut Line) {
        render_template(self.template, self.binding.map(SensorCell::get), out);
    }
}

/// A timed two-line status message
#[derive(Debug, Clone, Copy)]
pub struct DisplayMessage<'a> {
    /// How long the message stays up, in milliseconds
    pub duration_ms: u32,
    pub first: LineSpec<'a>,
    pub second: LineSpec<'a>,
}

/// Text of a message at one instant
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderedMessage {
    pub first: Line,
    pub second: Line,
}

impl<'a> DisplayMessage<'a> {
    pub const fn new(duration_ms: u32, first: LineSpec<'a>, second: LineSpec<'a>) -> Self {
        Self {
            duration_ms,
            first,
            second,
        }
    }

    /// Render both lines with the current values
    ///
    /// The first line always shows its template, substituted if bound.
    /// The second line is only shown when it has a bound value; otherwise
    /// it renders empty.
    pub fn render(&self) -> RenderedMessage {
        let mut rendered = RenderedMessage::default();
        self.first.render_into(&mut rendered.first);
        if self.second.has_value() {
            self.second.render_into(&mut rendered.second);
        }
        rendered
    }
}
