//! Display driver trait for the character LCD

/// Number of character rows on the status LCD
pub const LCD_ROWS: u8 = 2;

/// Number of character columns on the status LCD
pub const LCD_COLS: usize = 16;

/// Errors that can occur with the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Controller did not respond during initialisation
    NotResponding,
    /// Bus transfer to the display failed
    Bus,
    /// Row or column outside the display
    OutOfBounds,
}

/// Trait for the status display
///
/// The display is a dumb character device: the carousel decides what to
/// show, the driver only puts characters on the glass.
pub trait DisplayDriver {
    /// Bring the display controller up
    ///
    /// Must succeed before any text is written.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Clear the entire screen
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text at a position
    ///
    /// - `row`: Row number (0-1)
    /// - `col`: Column number (0-15)
    /// - `text`: ASCII text, clipped at the right edge
    fn text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;
}

/// Helper trait for whole-line drawing
pub trait DisplayExt: DisplayDriver {
    /// Replace a full row, padding with spaces so stale characters vanish
    fn draw_line(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        if row >= LCD_ROWS {
            return Err(DisplayError::OutOfBounds);
        }

        let mut buf = [b' '; LCD_COLS];
        let text_bytes = text.as_bytes();
        let len = text_bytes.len().min(LCD_COLS);
        buf[..len].copy_from_slice(&text_bytes[..len]);

        // Only ASCII reaches here; a split multibyte char degrades to blank
        let line = core::str::from_utf8(&buf).unwrap_or("");
        self.text(row, 0, line)
    }
}

// Blanket implementation for all DisplayDriver types
impl<T: DisplayDriver> DisplayExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::{String, Vec};

    #[derive(Default)]
    struct RowCapture {
        rows: Vec<(u8, String<LCD_COLS>), 4>,
    }

    impl DisplayDriver for RowCapture {
        fn init(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn clear(&mut self) -> Result<(), DisplayError> {
            self.rows.clear();
            Ok(())
        }

        fn text(&mut self, row: u8, _col: u8, text: &str) -> Result<(), DisplayError> {
            let mut s = String::new();
            s.push_str(text).map_err(|_| DisplayError::OutOfBounds)?;
            self.rows.push((row, s)).map_err(|_| DisplayError::Bus)
        }
    }

    #[test]
    fn test_draw_line_pads_to_width() {
        let mut lcd = RowCapture::default();
        lcd.draw_line(1, "Temp").unwrap();

        let (row, text) = &lcd.rows[0];
        assert_eq!(*row, 1);
        assert_eq!(text.len(), LCD_COLS);
        assert_eq!(text.as_str(), "Temp            ");
    }

    #[test]
    fn test_draw_line_clips_long_text() {
        let mut lcd = RowCapture::default();
        lcd.draw_line(0, "0123456789ABCDEFGHIJ").unwrap();
        assert_eq!(lcd.rows[0].1.as_str(), "0123456789ABCDEF");
    }

    #[test]
    fn test_draw_line_rejects_bad_row() {
        let mut lcd = RowCapture::default();
        assert_eq!(lcd.draw_line(2, "x"), Err(DisplayError::OutOfBounds));
    }
}
