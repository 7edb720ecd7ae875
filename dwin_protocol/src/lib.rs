/*!
# DWIN Display Protocol

Host-side driver for the DWIN T5UIC1 serial display controller used on
printer front panels. Every drawing operation is a single binary frame sent
over a serial channel; the controller renders it with its own fonts, icons
and cached pictures.

## Core Types

- [`Session`] - Handshaken connection that serializes frames onto a channel
- [`FrameBuilder`] - One command frame under construction
- [`Channel`] - Duplex byte channel the session writes to
- [`HandshakeReader`] - Reply parser for the connection handshake

## Modules

- [`encoder`] - Operand encoding and frame building
- [`channel`] - Channel trait and in-memory implementation
- [`handshake`] - Handshake state machine and retry policy
- [`session`] - Locked transport session
- [`commands`] - Drawing, text, picture and memory commands
- [`shapes`] - Circle rasterization from point commands
- [`config`] - Session configuration
- [`error`] - Common error types
*/

pub mod channel;
pub mod commands;
pub mod config;
pub mod encoder;
pub mod error;
pub mod handshake;
pub mod session;
pub mod shapes;

// Re-export commonly used types
pub use channel::{Channel, MemoryChannel};
pub use commands::{AreaMoveMode, Direction, MemoryTarget, NumberStyle, Rect, RectMode, Rotation, TextStyle};
pub use config::SessionConfig;
pub use encoder::FrameBuilder;
pub use error::{DwinError, Result};
pub use handshake::{HandshakeReader, HandshakeState, RetryPolicy};
pub use session::Session;

/// Version information for the protocol library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol constants
pub mod protocol {
    /// Visible display width in pixels
    pub const WIDTH: i32 = 272;

    /// Visible display height in pixels
    pub const HEIGHT: i32 = 480;

    /// Sync byte that starts every frame on the wire
    pub const FRAME_HEADER: u8 = 0xAA;

    /// Fixed end-of-frame marker
    pub const TRAILER: [u8; 4] = [0xCC, 0x33, 0xC3, 0x3C];

    /// Command opcodes
    pub mod opcode {
        pub const HANDSHAKE: u8 = 0x00;
        pub const CLEAR: u8 = 0x01;
        pub const POINT: u8 = 0x02;
        pub const LINE: u8 = 0x03;
        pub const RECTANGLE: u8 = 0x05;
        pub const AREA_MOVE: u8 = 0x09;
        pub const STRING: u8 = 0x11;
        pub const NUMBER: u8 = 0x14;
        pub const QR_CODE: u8 = 0x21;
        pub const JPEG_SHOW: u8 = 0x22;
        pub const ICON: u8 = 0x23;
        pub const JPEG_CACHE: u8 = 0x25;
        pub const AREA_COPY: u8 = 0x27;
        pub const ICON_ANIMATION: u8 = 0x28;
        pub const BACKLIGHT: u8 = 0x30;
        pub const WRITE_MEMORY: u8 = 0x31;
        pub const PICTURE_MEMORY: u8 = 0x33;
        pub const FRAME_DIRECTION: u8 = 0x34;
        pub const REFRESH: u8 = 0x3D;
    }
}

/// RGB565 colours used by the printer screens
pub mod palette {
    pub const WHITE: u16 = 0xFFFF;
    pub const YELLOW: u16 = 0xFF0F;
    /// Popup background
    pub const BG_WINDOW: u16 = 0x31E8;
    pub const BG_BLUE: u16 = 0x1125;
    pub const BG_BLACK: u16 = 0x0841;
    pub const BG_RED: u16 = 0xF00F;
    pub const POPUP_TEXT: u16 = 0xD6BA;
    /// Split line
    pub const LINE: u16 = 0x3A6A;
    /// Selection cursor
    pub const RECTANGLE: u16 = 0xEE2F;
    pub const PERCENT: u16 = 0xFE29;
    /// Progress bar fill
    pub const BAR_FILL: u16 = 0x10E4;
    pub const SELECT: u16 = 0x33BB;
}

/// Device-resident font size codes
pub mod font {
    pub const F6X12: u8 = 0x00;
    pub const F8X16: u8 = 0x01;
    pub const F10X20: u8 = 0x02;
    pub const F12X24: u8 = 0x03;
    pub const F14X28: u8 = 0x04;
    pub const F16X32: u8 = 0x05;
    pub const F20X40: u8 = 0x06;
    pub const F24X48: u8 = 0x07;
    pub const F28X56: u8 = 0x08;
    pub const F32X64: u8 = 0x09;

    pub const MENU: u8 = F8X16;
    pub const STATUS: u8 = F10X20;
    pub const HEADER: u8 = F10X20;

    /// Largest valid size code
    pub const MAX: u8 = F32X64;

    /// Glyph width in pixels for a size code
    pub fn glyph_width(size: u8) -> i32 {
        match size {
            F6X12 => 6,
            F8X16 => 8,
            F10X20 => 10,
            F12X24 => 12,
            F14X28 => 14,
            F16X32 => 16,
            F20X40 => 20,
            F24X48 => 24,
            F28X56 => 28,
            _ => 32,
        }
    }
}
