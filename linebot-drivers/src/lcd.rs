//! HD44780 character LCD behind a PCF8574 I2C expander
//!
//! The usual "I2C backpack" wiring runs the controller in 4-bit mode:
//!
//! | PCF8574 | P0 | P1 | P2 | P3        | P4..P7 |
//! |---------|----|----|----|-----------|--------|
//! | HD44780 | RS | RW | EN | backlight | D4..D7 |
//!
//! RW is tied low; the driver never reads the busy flag and waits out the
//! datasheet execution times instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use linebot_core::traits::{DisplayDriver, DisplayError, LCD_COLS, LCD_ROWS};

/// Default expander address (A0..A2 pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x27;

/// Register select: data when set, instruction when clear
const RS: u8 = 1 << 0;
const EN: u8 = 1 << 2;
const BACKLIGHT: u8 = 1 << 3;

/// Instruction set subset
mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const ENTRY_MODE_INCREMENT: u8 = 0x06;
    pub const DISPLAY_ON: u8 = 0x0C;
    pub const FUNCTION_4BIT_2LINE: u8 = 0x28;
    pub const SET_DDRAM_ADDR: u8 = 0x80;
}

/// DDRAM address of the first column of each row
const ROW_OFFSETS: [u8; LCD_ROWS as usize] = [0x00, 0x40];

/// Execution time of an ordinary instruction, with margin
const COMMAND_US: u32 = 50;
/// Execution time of clear/home
const CLEAR_MS: u32 = 2;
/// Power-on settle time before the first instruction
const POWER_ON_MS: u32 = 50;

/// 16x2 HD44780 LCD
pub struct Hd44780<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    backlight: bool,
    ready: bool,
}

impl<I: I2c, D: DelayNs> Hd44780<I, D> {
    /// Create a driver at the default expander address
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: true,
            ready: false,
        }
    }

    /// Switch the backlight
    pub fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = on;
        let bits = self.control_bits();
        self.i2c
            .write(self.address, &[bits])
            .map_err(|_| DisplayError::Bus)
    }

    /// Release the bus and delay provider
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn control_bits(&self) -> u8 {
        if self.backlight {
            BACKLIGHT
        } else {
            0
        }
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I::Error> {
        let bits = (nibble << 4) | mode | self.control_bits();
        // Latched on the falling edge of EN
        self.i2c.write(self.address, &[bits | EN, bits])?;
        self.delay.delay_us(COMMAND_US);
        Ok(())
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)
    }

    fn power_on_sequence(&mut self) -> Result<(), I::Error> {
        // Three times 8-bit function set resynchronises the interface from
        // any state, then the switch to 4-bit
        for wait_us in [4_500, 4_500, 150] {
            self.write_nibble(0x3, 0)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x2, 0)?;

        self.send(cmd::FUNCTION_4BIT_2LINE, 0)?;
        self.send(cmd::DISPLAY_ON, 0)?;
        self.send(cmd::CLEAR, 0)?;
        self.delay.delay_ms(CLEAR_MS);
        self.send(cmd::ENTRY_MODE_INCREMENT, 0)
    }
}

impl<I: I2c, D: DelayNs> DisplayDriver for Hd44780<I, D> {
    fn init(&mut self) -> Result<(), DisplayError> {
        self.ready = false;
        self.delay.delay_ms(POWER_ON_MS);
        self.power_on_sequence()
            .map_err(|_| DisplayError::NotResponding)?;
        self.ready = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        if !self.ready {
            return Err(DisplayError::NotResponding);
        }
        self.send(cmd::CLEAR, 0).map_err(|_| DisplayError::Bus)?;
        self.delay.delay_ms(CLEAR_MS);
        Ok(())
    }

    fn text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        if !self.ready {
            return Err(DisplayError::NotResponding);
        }
        let Some(&offset) = ROW_OFFSETS.get(row as usize) else {
            return Err(DisplayError::OutOfBounds);
        };
        if col as usize >= LCD_COLS {
            return Err(DisplayError::OutOfBounds);
        }

        self.send(cmd::SET_DDRAM_ADDR | (offset + col), 0)
            .map_err(|_| DisplayError::Bus)?;

        for ch in text.chars().take(LCD_COLS - col as usize) {
            let byte = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                b'?'
            };
            self.send(byte, RS).map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use heapless::Vec;
    use linebot_core::traits::DisplayExt;

    #[derive(Default)]
    struct FakeBus {
        writes: Vec<u8, 512>,
        address: Option<u8>,
        fail: bool,
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            self.address = Some(address);
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.extend_from_slice(bytes).unwrap();
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Reassemble (byte, is_data) pairs from the EN-strobed nibble writes
    fn decode(writes: &[u8]) -> Vec<(u8, bool), 64> {
        let mut out = Vec::new();
        let latched: Vec<u8, 256> = writes
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair[0], pair[1] | EN);
                pair[1]
            })
            .collect();
        for nibbles in latched.chunks(2) {
            let byte = (nibbles[0] & 0xF0) | (nibbles[1] >> 4);
            out.push((byte, nibbles[0] & RS != 0)).unwrap();
        }
        out
    }

    fn ready_lcd() -> Hd44780<FakeBus, NoDelay> {
        let mut lcd = Hd44780::new(FakeBus::default(), NoDelay);
        lcd.init().unwrap();
        lcd.i2c.writes.clear();
        lcd
    }

    #[test]
    fn test_init_sequence() {
        let mut lcd = Hd44780::new(FakeBus::default(), NoDelay);
        lcd.init().unwrap();

        let bus = &lcd.i2c;
        assert_eq!(bus.address, Some(DEFAULT_ADDRESS));
        // 4 bare nibbles, then 4 full instructions
        assert_eq!(bus.writes.len(), (4 + 4 * 2) * 2);
        assert_eq!(bus.writes[1], 0x30 | BACKLIGHT);
        assert_eq!(bus.writes[7], 0x20 | BACKLIGHT);
        assert_eq!(
            decode(&bus.writes[8..]).as_slice(),
            &[
                (cmd::FUNCTION_4BIT_2LINE, false),
                (cmd::DISPLAY_ON, false),
                (cmd::CLEAR, false),
                (cmd::ENTRY_MODE_INCREMENT, false),
            ]
        );
    }

    #[test]
    fn test_text_on_second_row() {
        let mut lcd = ready_lcd();
        lcd.text(1, 3, "Hi").unwrap();
        assert_eq!(
            decode(&lcd.i2c.writes).as_slice(),
            &[(0xC3, false), (b'H', true), (b'i', true)]
        );
    }

    #[test]
    fn test_text_clipped_and_sanitised() {
        let mut lcd = ready_lcd();
        lcd.text(0, 14, "a°bcd").unwrap();
        assert_eq!(
            decode(&lcd.i2c.writes).as_slice(),
            &[(0x8E, false), (b'a', true), (b'?', true)]
        );
    }

    #[test]
    fn test_bounds() {
        let mut lcd = ready_lcd();
        assert_eq!(lcd.text(2, 0, "x"), Err(DisplayError::OutOfBounds));
        assert_eq!(lcd.text(0, 16, "x"), Err(DisplayError::OutOfBounds));
        assert!(lcd.i2c.writes.is_empty());
    }

    #[test]
    fn test_draw_line_pads_row() {
        let mut lcd = ready_lcd();
        lcd.draw_line(0, "Temp: 27.50").unwrap();
        let sent = decode(&lcd.i2c.writes);
        assert_eq!(sent.len(), 1 + LCD_COLS);
        assert_eq!(sent[LCD_COLS], (b' ', true));
    }

    #[test]
    fn test_bus_errors() {
        let mut lcd = Hd44780::new(
            FakeBus {
                fail: true,
                ..Default::default()
            },
            NoDelay,
        );
        assert_eq!(lcd.init(), Err(DisplayError::NotResponding));
        assert_eq!(lcd.text(0, 0, "x"), Err(DisplayError::NotResponding));

        let mut lcd = ready_lcd();
        lcd.i2c.fail = true;
        assert_eq!(lcd.clear(), Err(DisplayError::Bus));
    }

    #[test]
    fn test_backlight_off_clears_bit() {
        let mut lcd = ready_lcd();
        lcd.set_backlight(false).unwrap();
        lcd.text(0, 0, "A").unwrap();
        assert_eq!(lcd.i2c.writes[0], 0);
        assert!(lcd.i2c.writes[1..].iter().all(|b| b & BACKLIGHT == 0));
    }
}
