//! Display carousel
//!
//! Rotates a fixed-capacity list of status messages on the LCD. The
//! periodic timer advances the carousel; the display task renders the
//! current message whenever it likes. Rotation is positional: messages are
//! never consumed, the index wraps back to the first after the last.

pub mod format;
pub mod message;

pub use format::{render_template, Line, LINE_CAPACITY};
pub use message::{DisplayMessage, LineSpec, RenderedMessage};

use heapless::Vec;

use crate::traits::{DisplayDriver, DisplayError, DisplayExt};

/// Default number of carousel slots
pub const CAROUSEL_CAPACITY: usize = 8;

/// Carousel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CarouselError {
    /// No free slot left
    Full,
}

/// Rotating set of display messages
///
/// Display order is insertion order.
#[derive(Debug)]
pub struct Carousel<'a, const N: usize = CAROUSEL_CAPACITY> {
    messages: Vec<DisplayMessage<'a>, N>,
    index: usize,
    elapsed_ms: u32,
}

impl<const N: usize> Default for Carousel<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Carousel<'a, N> {
    /// Create an empty carousel
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            index: 0,
            elapsed_ms: 0,
        }
    }

    /// Append a message at the end of the rotation
    ///
    /// Append during setup, before the timer starts advancing.
    pub fn append(&mut self, message: DisplayMessage<'a>) -> Result<(), CarouselError> {
        self.messages
            .push(message)
            .map_err(|_| CarouselError::Full)
    }

    /// Account for `delta_ms` of display time
    ///
    /// Once the current message's duration is reached, elapsed time resets
    /// and the next message becomes current. Returns `true` on rotation.
    /// Constant time; safe to call from the timer interrupt.
    pub fn advance(&mut self, delta_ms: u32) -> bool {
        let Some(current) = self.messages.get(self.index) else {
            return false;
        };

        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        if self.elapsed_ms < current.duration_ms {
            return false;
        }

        self.rotate();
        true
    }

    /// Switch to the next message immediately
    pub fn rotate(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        self.elapsed_ms = 0;
        self.index = (self.index + 1) % self.messages.len();
    }

    /// Index of the current message
    pub fn index(&self) -> usize {
        self.index
    }

    /// Time the current message has been up
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Current message, if any
    pub fn current(&self) -> Option<&DisplayMessage<'a>> {
        self.messages.get(self.index)
    }

    /// All messages in display order
    pub fn iter(&self) -> impl Iterator<Item = &DisplayMessage<'a>> {
        self.messages.iter()
    }

    /// Render the current message with live values
    pub fn render(&self) -> Option<RenderedMessage> {
        self.current().map(DisplayMessage::render)
    }

    /// Render the current message onto the display
    ///
    /// Both rows are rewritten in full so nothing stale survives. Returns
    /// `false` when there is nothing to show.
    pub fn render_to<D: DisplayDriver>(&self, display: &mut D) -> Result<bool, DisplayError> {
        let Some(rendered) = self.render() else {
            return Ok(false);
        };
        display.draw_line(0, &rendered.first)?;
        display.draw_line(1, &rendered.second)?;
        Ok(true)
    }
}
