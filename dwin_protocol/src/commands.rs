/*!
Display commands.

Each command validates its arguments, then builds and sends exactly one
frame. Two coordinate policies apply: geometric commands (rectangles, lines,
icons, area copy/move, QR codes) clamp coordinates into the viewport, while
text and numeric commands reject coordinates outside it.
*/

use crate::channel::Channel;
use crate::encoder::FrameBuilder;
use crate::error::{DwinError, Result};
use crate::font;
use crate::palette;
use crate::protocol::{opcode, HEIGHT, WIDTH};
use crate::session::Session;

/// Longest text accepted by [`Session::draw_string`]
pub const STRING_MAX_CHARS: usize = 100;

/// Largest digit count for numeric fields
pub const MAX_DIGITS: u8 = 10;

/// Largest QR code module size that still fits the screen
pub const QR_MAX_PIXEL: u8 = 6;

/// Minimum backlight level; darker settings make the panel unreadable
pub const BACKLIGHT_FLOOR: u8 = 0x1F;

/// Largest payload for one memory write
pub const MEMORY_CHUNK_MAX: usize = 240;

/// Paste point used for title bar copies
const TITLE_ORIGIN: (i32, i32) = (14, 8);

/// Magic prefix of the frame direction and picture memory commands
const MAGIC: [u8; 2] = [0x5A, 0xA5];

/// Rectangle drawing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RectMode {
    Outline = 0,
    Fill = 1,
    XorFill = 2,
}

/// Screen rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Rotation {
    Deg0 = 0,
    Deg90 = 1,
    Deg180 = 2,
    Deg270 = 3,
}

/// How an area move treats pixels shifted out of the area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AreaMoveMode {
    /// Pixels wrap around to the opposite edge
    Circular = 0,
    /// Pixels are dropped and the gap filled with the fill colour
    Translate = 1,
}

/// Area move direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
}

/// Controller memory written by [`Session::write_memory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MemoryTarget {
    /// 32KB SRAM, addresses 0x0000-0x7FFF
    Sram = 0x5A,
    /// 16KB Flash, addresses 0x0000-0x3FFF
    Flash = 0xA5,
}

impl MemoryTarget {
    /// Highest writable address
    pub fn max_address(self) -> u16 {
        match self {
            Self::Sram => 0x7FFF,
            Self::Flash => 0x3FFF,
        }
    }
}

/// Rectangle corners in screen coordinates, in any order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clamp into the viewport and order corners so x1 <= x2 and y1 <= y2
    pub fn clamped(&self) -> Self {
        let (x1, x2) = ordered(clamp_x(self.x1), clamp_x(self.x2));
        let (y1, y2) = ordered(clamp_y(self.y1), clamp_y(self.y2));
        Self { x1, y1, x2, y2 }
    }

    fn put(&self, frame: &mut FrameBuilder) -> Result<()> {
        frame.word(self.x1)?.word(self.y1)?.word(self.x2)?.word(self.y2)?;
        Ok(())
    }
}

/// Appearance of a text string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Let the controller adjust character widths
    pub width_adjust: bool,
    /// Paint the background colour behind glyphs
    pub show_background: bool,
    /// Font size code, see [`crate::font`]
    pub size: u8,
    pub color: u16,
    pub background: u16,
}

impl TextStyle {
    pub fn new(size: u8, color: u16, background: u16) -> Self {
        Self {
            width_adjust: false,
            show_background: true,
            size,
            color,
            background,
        }
    }

    fn attributes(&self) -> u8 {
        (u8::from(self.width_adjust) << 7) | (u8::from(self.show_background) << 6) | self.size
    }
}

/// Appearance of a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyle {
    pub show_background: bool,
    /// Pad to the digit count
    pub zero_fill: bool,
    /// Pad with '0' instead of spaces
    pub zero_mode: bool,
    pub size: u8,
    pub color: u16,
    pub background: u16,
}

impl NumberStyle {
    pub fn new(size: u8, color: u16, background: u16) -> Self {
        Self {
            show_background: true,
            zero_fill: false,
            zero_mode: false,
            size,
            color,
            background,
        }
    }

    /// Attribute byte: bit7 background, bit6 signed, bit5 zero fill,
    /// bit4 zero mode, bits3-0 font size
    fn attributes(&self, signed: bool) -> u8 {
        (u8::from(self.show_background) << 7)
            | (u8::from(signed) << 6)
            | (u8::from(self.zero_fill) << 5)
            | (u8::from(self.zero_mode) << 4)
            | self.size
    }
}

fn clamp_x(x: i32) -> i32 {
    x.clamp(0, WIDTH - 1)
}

fn clamp_y(y: i32) -> i32 {
    y.clamp(0, HEIGHT - 1)
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn check_position(x: i32, y: i32) -> Result<()> {
    if (0..WIDTH).contains(&x) && (0..HEIGHT).contains(&y) {
        Ok(())
    } else {
        Err(DwinError::validation(format!("coordinates out of bounds: ({}, {})", x, y)))
    }
}

fn check_font(size: u8) -> Result<()> {
    if size <= font::MAX {
        Ok(())
    } else {
        Err(DwinError::validation(format!("font size must be 0-9, got {}", size)))
    }
}

fn check_range(name: &str, value: u8, min: u8, max: u8) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DwinError::validation(format!(
            "{} must be {}-{}, got {}",
            name, min, max, value
        )))
    }
}

/// Scale `value` to a fixed-point integer with `frac_digits` decimals
fn fixed_point(value: f64, frac_digits: u8) -> Result<u32> {
    if !value.is_finite() {
        return Err(DwinError::validation(format!("invalid float value: {}", value)));
    }
    let scaled = (value * 10f64.powi(i32::from(frac_digits))).round();
    if scaled < 0.0 || scaled > f64::from(u32::MAX) {
        return Err(DwinError::range("Long", scaled as i128));
    }
    Ok(scaled as u32)
}

impl<C: Channel> Session<C> {
    /// Fill the whole screen with `color`
    pub fn clear(&self, color: u16) -> Result<()> {
        self.send(opcode::CLEAR, |f| {
            f.word(color)?;
            Ok(())
        })
    }

    /// Draw one block of `nx` x `ny` pixels with its upper left corner at (x, y)
    pub fn draw_point(&self, color: u16, nx: u8, ny: u8, x: i32, y: i32) -> Result<()> {
        check_range("point width", nx, 1, 0x0F)?;
        check_range("point height", ny, 1, 0x0F)?;
        self.send(opcode::POINT, |f| {
            f.word(color)?.byte(nx)?.byte(ny)?.word(x)?.word(y)?;
            Ok(())
        })
    }

    /// Draw a line segment; endpoints are clamped into the viewport
    pub fn draw_line(&self, color: u16, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.send(opcode::LINE, |f| {
            f.word(color)?
                .word(clamp_x(x1))?
                .word(clamp_y(y1))?
                .word(clamp_x(x2))?
                .word(clamp_y(y2))?;
            Ok(())
        })
    }

    /// Draw a rectangle. Corners are clamped and reordered, never rejected.
    pub fn draw_rectangle(&self, mode: RectMode, color: u16, rect: Rect) -> Result<()> {
        let rect = rect.clamped();
        self.send(opcode::RECTANGLE, |f| {
            f.byte(mode as u8)?.word(color)?;
            rect.put(f)
        })
    }

    /// Shift the pixels inside `rect` by `distance` towards `direction`
    pub fn area_move(
        &self,
        mode: AreaMoveMode,
        direction: Direction,
        distance: u16,
        fill: u16,
        rect: Rect,
    ) -> Result<()> {
        let rect = rect.clamped();
        self.send(opcode::AREA_MOVE, |f| {
            f.byte(((mode as u8) << 7) | direction as u8)?
                .word(distance)?
                .word(fill)?;
            rect.put(f)
        })
    }

    /// Draw a string with its upper left corner at (x, y).
    ///
    /// Unlike the geometric commands, out-of-bounds coordinates are rejected.
    pub fn draw_string(&self, style: &TextStyle, x: i32, y: i32, text: &str) -> Result<()> {
        let chars = text.chars().count();
        if chars > STRING_MAX_CHARS {
            return Err(DwinError::validation(format!("string too long: {} characters", chars)));
        }
        check_position(x, y)?;
        check_font(style.size)?;

        self.send(opcode::STRING, |f| {
            f.byte(style.attributes())?
                .word(style.color)?
                .word(style.background)?
                .word(x)?
                .word(y)?;
            f.text(text);
            Ok(())
        })
    }

    /// Draw an integer right-aligned in a field of `digits` characters
    pub fn draw_int_value(&self, style: &NumberStyle, digits: u8, x: i32, y: i32, value: i64) -> Result<()> {
        check_position(x, y)?;
        check_font(style.size)?;
        check_range("digit count", digits, 1, MAX_DIGITS)?;

        self.send(opcode::NUMBER, |f| {
            f.byte(style.attributes(value < 0))?
                .word(style.color)?
                .word(style.background)?
                .byte(digits)?
                .byte(0)?
                .word(x)?
                .word(y)?
                // Negative values travel as two's complement with the signed flag set.
                .double(value as u64)?;
            Ok(())
        })
    }

    /// Draw a non-negative decimal with `int_digits` whole and `frac_digits`
    /// fractional digits. The value is sent as a fixed-point long.
    pub fn draw_float_value(
        &self,
        style: &NumberStyle,
        int_digits: u8,
        frac_digits: u8,
        x: i32,
        y: i32,
        value: f64,
    ) -> Result<()> {
        check_position(x, y)?;
        check_font(style.size)?;
        check_range("integer digits", int_digits, 1, MAX_DIGITS)?;
        check_range("fraction digits", frac_digits, 0, MAX_DIGITS)?;
        let fixed = fixed_point(value, frac_digits)?;

        self.send(opcode::NUMBER, |f| {
            f.byte(style.attributes(false))?
                .word(style.color)?
                .word(style.background)?
                .byte(int_digits)?
                .byte(frac_digits)?
                .word(x)?
                .word(y)?
                .long(fixed)?;
            Ok(())
        })
    }

    /// Draw a signed decimal: a sign glyph six pixels left of (x, y), then the
    /// magnitude. Both frames are validated before either is sent; these are
    /// still two frames, so a transport failure on the second leaves the sign
    /// on screen.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_signed_float(
        &self,
        size: u8,
        background: u16,
        int_digits: u8,
        frac_digits: u8,
        x: i32,
        y: i32,
        value: f64,
    ) -> Result<()> {
        check_position(x.saturating_sub(6), y)?;
        check_position(x, y)?;
        check_font(size)?;
        check_range("integer digits", int_digits, 1, MAX_DIGITS)?;
        check_range("fraction digits", frac_digits, 0, MAX_DIGITS)?;
        fixed_point(value.abs(), frac_digits)?;

        let sign = if value < 0.0 { "-" } else { " " };
        let sign_style = TextStyle::new(size, palette::WHITE, background);
        self.draw_string(&sign_style, x.saturating_sub(6), y, sign)?;

        let style = NumberStyle {
            zero_fill: true,
            ..NumberStyle::new(size, palette::WHITE, background)
        };
        self.draw_float_value(&style, int_digits, frac_digits, x, y, value.abs())
    }

    /// Decode picture `pic` to the screen and cache it in virtual area 0
    pub fn jpeg_show_and_cache(&self, pic: u8) -> Result<()> {
        self.send(opcode::JPEG_SHOW, |f| {
            f.byte(0)?.byte(pic)?;
            Ok(())
        })
    }

    /// Decode picture `pic` into virtual display area `slot`
    pub fn jpeg_cache_to(&self, slot: u8, pic: u8) -> Result<()> {
        self.send(opcode::JPEG_CACHE, |f| {
            f.byte(slot)?.byte(pic)?;
            Ok(())
        })
    }

    /// Decode picture `pic` into virtual display area 1
    pub fn jpeg_cache_to_1(&self, pic: u8) -> Result<()> {
        self.jpeg_cache_to(1, pic)
    }

    /// Draw icon `pic` from library `lib` (0-127) at (x, y)
    pub fn show_icon(&self, lib: u8, pic: u8, x: i32, y: i32) -> Result<()> {
        check_range("icon library", lib, 0, 0x7F)?;
        self.send(opcode::ICON, |f| {
            f.word(clamp_x(x))?.word(clamp_y(y))?.byte(0x80 | lib)?.byte(pic)?;
            Ok(())
        })
    }

    /// Configure icon animation `anim` (0-15) cycling icons `first..=last`
    /// every `interval` x 10ms
    #[allow(clippy::too_many_arguments)]
    pub fn icon_animation(
        &self,
        anim: u8,
        enabled: bool,
        lib: u8,
        first: u8,
        last: u8,
        x: i32,
        y: i32,
        interval: u8,
    ) -> Result<()> {
        check_range("animation id", anim, 0, 0x0F)?;
        self.send(opcode::ICON_ANIMATION, |f| {
            // bit7 on/off, bit6 start from the first icon, bits3-0 animation id
            f.word(clamp_x(x))?
                .word(clamp_y(y))?
                .byte((u8::from(enabled) << 7) | 0x40 | anim)?
                .byte(lib)?
                .byte(first)?
                .byte(last)?
                .byte(interval)?;
            Ok(())
        })
    }

    /// Switch all sixteen animations at once, one bit per animation id
    pub fn icon_animation_control(&self, state: u16) -> Result<()> {
        self.send(opcode::ICON_ANIMATION, |f| {
            f.word(state)?;
            Ok(())
        })
    }

    /// Copy `source` from virtual area `cache` (0-127) to the screen at (x, y)
    pub fn area_copy(&self, cache: u8, source: Rect, x: i32, y: i32) -> Result<()> {
        check_range("cache id", cache, 0, 0x7F)?;
        let source = source.clamped();
        self.send(opcode::AREA_COPY, |f| {
            f.byte(0x80 | cache)?;
            source.put(f)?;
            f.word(clamp_x(x))?.word(clamp_y(y))?;
            Ok(())
        })
    }

    /// Copy a title graphic from virtual area `cache` into the title bar
    pub fn title_copy(&self, cache: u8, source: Rect) -> Result<()> {
        self.area_copy(cache, source, TITLE_ORIGIN.0, TITLE_ORIGIN.1)
    }

    /// Draw `data` as a QR code; module sizes above 6 pixels are capped
    pub fn qr_code(&self, pixel: u8, x: i32, y: i32, data: &str) -> Result<()> {
        let pixel = pixel.min(QR_MAX_PIXEL);
        self.send(opcode::QR_CODE, |f| {
            f.word(clamp_x(x))?.word(clamp_y(y))?.byte(pixel)?;
            f.text(data);
            Ok(())
        })
    }

    /// Set backlight luminance, clamped to 0-255 then raised to at least 0x1F
    pub fn set_backlight(&self, level: i32) -> Result<()> {
        let level = backlight_level(level);
        self.send(opcode::BACKLIGHT, |f| {
            f.byte(level)?;
            Ok(())
        })
    }

    /// Rotate the frame buffer
    pub fn set_direction(&self, rotation: Rotation) -> Result<()> {
        self.send(opcode::FRAME_DIRECTION, |f| {
            f.raw(&MAGIC).byte(rotation as u8)?;
            Ok(())
        })
    }

    /// Present everything drawn since the last refresh
    pub fn refresh(&self) -> Result<()> {
        self.send(opcode::REFRESH, |_| Ok(()))
    }

    /// Write up to 240 bytes to controller memory at `address`
    pub fn write_memory(&self, target: MemoryTarget, address: u16, data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() > MEMORY_CHUNK_MAX {
            return Err(DwinError::validation(format!(
                "memory write must carry 1-{} bytes, got {}",
                MEMORY_CHUNK_MAX,
                data.len()
            )));
        }
        let end = usize::from(address) + data.len() - 1;
        if end > usize::from(target.max_address()) {
            return Err(DwinError::validation(format!(
                "memory write {:#06x}..={:#06x} exceeds {:?}",
                address, end, target
            )));
        }

        self.send(opcode::WRITE_MEMORY, |f| {
            f.byte(target as u8)?.word(address)?.raw(data);
            Ok(())
        })
    }

    /// Store the SRAM contents as picture `pic` (0-15)
    pub fn save_picture_memory(&self, pic: u8) -> Result<()> {
        check_range("picture id", pic, 0, 0x0F)?;
        self.send(opcode::PICTURE_MEMORY, |f| {
            f.raw(&MAGIC).byte(pic)?;
            Ok(())
        })
    }
}

/// Backlight byte actually sent for a requested level
pub fn backlight_level(level: i32) -> u8 {
    let clamped = level.clamp(0, 255) as u8;
    clamped.max(BACKLIGHT_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{connected, frames};

    fn words(bytes: &[u8]) -> Vec<u16> {
        bytes
            .chunks(2)
            .map(|w| u16::from_be_bytes([w[0], w[1]]))
            .collect()
    }

    #[test]
    fn test_clear_frame() {
        let (session, wire) = connected();
        session.clear(palette::BG_BLUE).unwrap();
        assert_eq!(frames(&wire.written()), vec![vec![0x01, 0x11, 0x25]]);
    }

    #[test]
    fn test_rectangle_clamps_and_orders() {
        let (session, wire) = connected();
        let inputs = [
            Rect::new(10, 20, 30, 40),
            Rect::new(30, 40, 10, 20),
            Rect::new(-50, 600, 300, -1),
            Rect::new(271, 479, 272, 480),
            Rect::new(i32::MIN, i32::MAX, i32::MAX, i32::MIN),
        ];
        for rect in inputs {
            session.draw_rectangle(RectMode::Fill, 0xF800, rect).unwrap();
        }

        let sent = frames(&wire.written());
        assert_eq!(sent.len(), inputs.len());
        for frame in &sent {
            assert_eq!(&frame[..4], &[0x05, 0x01, 0xF8, 0x00]);
            let c = words(&frame[4..]);
            assert!(c[0] <= c[2] && c[1] <= c[3]);
            assert!(c[2] <= 271 && c[3] <= 479);
        }
        assert_eq!(words(&sent[1][4..]), vec![10, 20, 30, 40]);
        assert_eq!(words(&sent[2][4..]), vec![0, 0, 271, 479]);
    }

    #[test]
    fn test_rectangle_clamps_any_input() {
        use proptest::prelude::*;

        let (session, wire) = connected();
        let coord = any::<i32>();

        proptest!(|(x1 in coord.clone(), y1 in coord.clone(), x2 in coord.clone(), y2 in coord)| {
            wire.clear_written();
            session.draw_rectangle(RectMode::Outline, 0x07E0, Rect::new(x1, y1, x2, y2)).unwrap();

            let sent = frames(&wire.written());
            prop_assert_eq!(sent.len(), 1);
            let c = words(&sent[0][4..]);
            prop_assert!(c[0] <= c[2] && c[1] <= c[3]);
            prop_assert!(c[2] <= 271 && c[3] <= 479);

            // In-range corners survive, only reordered.
            let (lo_x, hi_x) = ordered(clamp_x(x1), clamp_x(x2));
            prop_assert_eq!(i32::from(c[0]), lo_x);
            prop_assert_eq!(i32::from(c[2]), hi_x);
        });
    }

    #[test]
    fn test_string_layout() {
        let (session, wire) = connected();
        let style = TextStyle {
            width_adjust: true,
            ..TextStyle::new(font::F10X20, palette::WHITE, palette::BG_BLACK)
        };
        session.draw_string(&style, 12, 200, "Hi").unwrap();
        assert_eq!(
            frames(&wire.written()),
            vec![vec![
                0x11, 0xC2, 0xFF, 0xFF, 0x08, 0x41, 0x00, 0x0C, 0x00, 0xC8, b'H', b'i'
            ]]
        );
    }

    #[test]
    fn test_string_rejects_instead_of_clamping() {
        let (session, wire) = connected();
        let style = TextStyle::new(font::F8X16, palette::WHITE, palette::BG_BLACK);

        assert!(session.draw_string(&style, -1, 10, "x").unwrap_err().is_caller_error());
        assert!(session.draw_string(&style, 10, 480, "x").unwrap_err().is_caller_error());
        assert!(session.draw_string(&style, 272, 0, "x").is_err());
        let big = TextStyle::new(10, palette::WHITE, palette::BG_BLACK);
        assert!(session.draw_string(&big, 0, 0, "x").is_err());
        assert!(session.draw_string(&style, 0, 0, &"x".repeat(101)).is_err());

        assert!(wire.written().is_empty());
        session.draw_string(&style, 0, 0, &"x".repeat(100)).unwrap();
        assert_eq!(frames(&wire.written()).len(), 1);
    }

    #[test]
    fn test_int_value_layout() {
        let (session, wire) = connected();
        let style = NumberStyle {
            zero_fill: true,
            zero_mode: true,
            ..NumberStyle::new(font::F8X16, palette::WHITE, palette::BG_BLACK)
        };
        session.draw_int_value(&style, 3, 100, 50, 42).unwrap();
        session.draw_int_value(&style, 3, 100, 50, -1).unwrap();

        let sent = frames(&wire.written());
        assert_eq!(
            sent[0],
            vec![
                0x14, 0xB1, 0xFF, 0xFF, 0x08, 0x41, 0x03, 0x00, 0x00, 0x64, 0x00, 0x32, 0, 0, 0, 0, 0,
                0, 0, 42
            ]
        );
        assert_eq!(sent[1][1], 0xF1);
        assert_eq!(&sent[1][12..], &[0xFF; 8]);
    }

    #[test]
    fn test_int_value_validation() {
        let (session, wire) = connected();
        let style = NumberStyle::new(font::F8X16, palette::WHITE, palette::BG_BLACK);
        assert!(session.draw_int_value(&style, 0, 0, 0, 1).is_err());
        assert!(session.draw_int_value(&style, 11, 0, 0, 1).is_err());
        assert!(session.draw_int_value(&style, 5, 0, 480, 1).is_err());
        assert!(wire.written().is_empty());
    }

    #[test]
    fn test_float_value_fixed_point() {
        let (session, wire) = connected();
        let style = NumberStyle::new(font::F8X16, palette::WHITE, palette::BG_BLACK);
        session.draw_float_value(&style, 3, 1, 10, 10, 21.5).unwrap();

        let sent = frames(&wire.written());
        assert_eq!(&sent[0][6..8], &[3, 1]);
        assert_eq!(&sent[0][12..], &215u32.to_be_bytes());

        assert!(matches!(
            session.draw_float_value(&style, 10, 10, 10, 10, 1.0).unwrap_err(),
            DwinError::Range { operand: "Long", .. }
        ));
        assert!(session.draw_float_value(&style, 3, 1, 10, 10, -1.0).is_err());
        assert!(session.draw_float_value(&style, 3, 1, 10, 10, f64::NAN).is_err());
        assert!(session.draw_float_value(&style, 3, 11, 10, 10, 1.0).is_err());
        assert_eq!(frames(&wire.written()).len(), 1);
    }

    #[test]
    fn test_signed_float_sends_two_frames() {
        let (session, wire) = connected();
        session
            .draw_signed_float(font::F8X16, palette::BG_BLACK, 3, 2, 100, 40, -1.25)
            .unwrap();

        let sent = frames(&wire.written());
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0][0], opcode::STRING);
        assert_eq!(words(&sent[0][6..10]), vec![94, 40]);
        assert_eq!(sent[0][10], b'-');
        assert_eq!(sent[1][0], opcode::NUMBER);
        assert_eq!(&sent[1][12..], &125u32.to_be_bytes());

        wire.clear_written();
        session
            .draw_signed_float(font::F8X16, palette::BG_BLACK, 3, 2, 100, 40, 2.0)
            .unwrap();
        assert_eq!(frames(&wire.written())[0][10], b' ');
    }

    #[test]
    fn test_signed_float_sign_off_screen() {
        let (session, wire) = connected();
        assert!(session
            .draw_signed_float(font::F8X16, palette::BG_BLACK, 3, 2, 3, 40, 1.0)
            .is_err());
        assert!(wire.written().is_empty());
    }

    #[test]
    fn test_signed_float_invalid_magnitude_sends_nothing() {
        let (session, wire) = connected();
        let bg = palette::BG_BLACK;

        let err = session.draw_signed_float(font::F8X16, bg, 0, 2, 100, 40, -1.0).unwrap_err();
        assert!(err.is_caller_error());
        let err = session.draw_signed_float(font::F8X16, bg, 3, 2, 100, 40, 1e12).unwrap_err();
        assert!(matches!(err, DwinError::Range { operand: "Long", .. }));
        assert!(session.draw_signed_float(font::F8X16, bg, 3, 11, 100, 40, 1.0).is_err());
        assert!(session.draw_signed_float(font::F8X16, bg, 3, 2, 100, 40, f64::NAN).is_err());
        assert!(session.draw_signed_float(10, bg, 3, 2, 100, 40, 1.0).is_err());
        assert!(session.draw_signed_float(font::F8X16, bg, 3, 2, 100, 480, 1.0).is_err());

        assert!(wire.written().is_empty());
    }

    #[test]
    fn test_icon_and_animation() {
        let (session, wire) = connected();
        session.show_icon(9, 4, 300, -5).unwrap();
        assert!(session.show_icon(128, 4, 0, 0).is_err());
        session.icon_animation(2, true, 9, 1, 8, 20, 500, 25).unwrap();
        assert!(session.icon_animation(16, true, 9, 1, 8, 20, 20, 25).is_err());
        session.icon_animation_control(0x0004).unwrap();

        let sent = frames(&wire.written());
        assert_eq!(sent[0], vec![0x23, 0x01, 0x0F, 0x00, 0x00, 0x89, 0x04]);
        assert_eq!(
            sent[1],
            vec![0x28, 0x00, 0x14, 0x01, 0xDF, 0xC2, 9, 1, 8, 25]
        );
        assert_eq!(sent[2], vec![0x28, 0x00, 0x04]);
    }

    #[test]
    fn test_area_copy_and_move() {
        let (session, wire) = connected();
        session.area_copy(1, Rect::new(100, 50, 0, 0), 14, 8).unwrap();
        session.title_copy(1, Rect::new(0, 0, 100, 50)).unwrap();
        session
            .area_move(AreaMoveMode::Translate, Direction::Up, 20, palette::BG_BLACK, Rect::new(0, 0, 400, 100))
            .unwrap();
        assert!(session.area_copy(0x80, Rect::new(0, 0, 1, 1), 0, 0).is_err());

        let sent = frames(&wire.written());
        assert_eq!(sent[0], sent[1]);
        assert_eq!(sent[0][1], 0x81);
        assert_eq!(words(&sent[0][2..]), vec![0, 0, 100, 50, 14, 8]);
        assert_eq!(sent[2][..2], [0x09, 0x82]);
        assert_eq!(words(&sent[2][2..]), vec![20, 0x0841, 0, 0, 271, 100]);
    }

    #[test]
    fn test_jpeg_commands() {
        let (session, wire) = connected();
        session.jpeg_show_and_cache(3).unwrap();
        session.jpeg_cache_to_1(7).unwrap();
        assert_eq!(
            frames(&wire.written()),
            vec![vec![0x22, 0x00, 0x03], vec![0x25, 0x01, 0x07]]
        );
    }

    #[test]
    fn test_qr_code_caps_pixel_size() {
        let (session, wire) = connected();
        session.qr_code(9, 10, 20, "http://printer.local").unwrap();
        session.qr_code(0, 10, 20, "a").unwrap();
        let sent = frames(&wire.written());
        assert_eq!(&sent[0][..6], &[0x21, 0x00, 0x0A, 0x00, 0x14, 0x06]);
        assert_eq!(&sent[0][6..], b"http://printer.local");
        assert_eq!(sent[1][5], 0);
    }

    #[test]
    fn test_backlight_levels() {
        assert_eq!(backlight_level(0), 0x1F);
        assert_eq!(backlight_level(-20), 0x1F);
        assert_eq!(backlight_level(0x80), 0x80);
        assert_eq!(backlight_level(300), 0xFF);

        let (session, wire) = connected();
        session.set_backlight(0).unwrap();
        session.set_backlight(300).unwrap();
        assert_eq!(frames(&wire.written()), vec![vec![0x30, 0x1F], vec![0x30, 0xFF]]);
    }

    #[test]
    fn test_direction_and_refresh() {
        let (session, wire) = connected();
        session.set_direction(Rotation::Deg180).unwrap();
        session.refresh().unwrap();
        assert_eq!(
            frames(&wire.written()),
            vec![vec![0x34, 0x5A, 0xA5, 0x02], vec![0x3D]]
        );
    }

    #[test]
    fn test_point_and_line() {
        let (session, wire) = connected();
        session.draw_point(0xF800, 2, 2, 10, 20).unwrap();
        assert!(session.draw_point(0xF800, 0, 2, 10, 20).is_err());
        assert!(session.draw_point(0xF800, 2, 16, 10, 20).is_err());
        session.draw_line(palette::LINE, -5, 10, 400, 10).unwrap();

        let sent = frames(&wire.written());
        assert_eq!(sent[0], vec![0x02, 0xF8, 0x00, 2, 2, 0x00, 0x0A, 0x00, 0x14]);
        assert_eq!(words(&sent[1][1..]), vec![palette::LINE, 0, 10, 271, 10]);
    }

    #[test]
    fn test_memory_commands() {
        let (session, wire) = connected();
        session.write_memory(MemoryTarget::Sram, 0x0100, &[1, 2, 3]).unwrap();
        session.save_picture_memory(4).unwrap();
        assert!(session.write_memory(MemoryTarget::Flash, 0x3FFF, &[1, 2]).is_err());
        assert!(session.write_memory(MemoryTarget::Sram, 0, &[]).is_err());
        assert!(session.write_memory(MemoryTarget::Sram, 0, &[0; 241]).is_err());
        assert!(session.save_picture_memory(16).is_err());

        assert_eq!(
            frames(&wire.written()),
            vec![
                vec![0x31, 0x5A, 0x01, 0x00, 1, 2, 3],
                vec![0x33, 0x5A, 0xA5, 0x04]
            ]
        );
    }
}
