/*!
Frame building and operand encoding.

A [`FrameBuilder`] holds one command under construction: the opcode followed
by its operands. Every operand is range-checked against its wire width before
any byte is appended, so a builder never contains a half-written operand.
Builders are created per command and consumed by the session on send.
*/

use bytes::{BufMut, BytesMut};
use tracing::warn;

use crate::error::{DwinError, Result};

/// Maximum number of characters a text operand may carry
pub const TEXT_MAX_CHARS: usize = 255;

/// Encode a value as a single byte
pub fn encode_byte(value: i64) -> Result<[u8; 1]> {
    u8::try_from(value)
        .map(|v| [v])
        .map_err(|_| DwinError::range("Byte", value))
}

/// Encode a value as a big-endian 16-bit word
pub fn encode_word(value: i64) -> Result<[u8; 2]> {
    u16::try_from(value)
        .map(u16::to_be_bytes)
        .map_err(|_| DwinError::range("Word", value))
}

/// Encode a value as a big-endian 32-bit long
pub fn encode_long(value: i64) -> Result<[u8; 4]> {
    u32::try_from(value)
        .map(u32::to_be_bytes)
        .map_err(|_| DwinError::range("Long", value))
}

/// Encode a value as a big-endian 64-bit double word
pub fn encode_double(value: i128) -> Result<[u8; 8]> {
    u64::try_from(value)
        .map(u64::to_be_bytes)
        .map_err(|_| DwinError::range("Double", value))
}

/// One command frame under construction
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    buf: BytesMut,
}

impl FrameBuilder {
    /// Start a frame with the given opcode
    pub fn new(opcode: u8) -> Self {
        let mut buf = BytesMut::with_capacity(32);
        buf.put_u8(opcode);
        Self { buf }
    }

    /// Opcode this frame was started with
    pub fn opcode(&self) -> u8 {
        self.buf[0]
    }

    /// Append a Byte operand
    pub fn byte(&mut self, value: impl Into<i64>) -> Result<&mut Self> {
        self.buf.put_slice(&encode_byte(value.into())?);
        Ok(self)
    }

    /// Append a Word operand
    pub fn word(&mut self, value: impl Into<i64>) -> Result<&mut Self> {
        self.buf.put_slice(&encode_word(value.into())?);
        Ok(self)
    }

    /// Append a Long operand
    pub fn long(&mut self, value: impl Into<i64>) -> Result<&mut Self> {
        self.buf.put_slice(&encode_long(value.into())?);
        Ok(self)
    }

    /// Append a Double operand
    pub fn double(&mut self, value: impl Into<i128>) -> Result<&mut Self> {
        self.buf.put_slice(&encode_double(value.into())?);
        Ok(self)
    }

    /// Append a text operand, truncated to [`TEXT_MAX_CHARS`] characters.
    ///
    /// Returns `true` when the text had to be truncated. Truncation is not an
    /// error; the shortened text is still appended.
    pub fn text(&mut self, text: &str) -> bool {
        match text.char_indices().nth(TEXT_MAX_CHARS) {
            Some((cut, _)) => {
                warn!(
                    "Text truncated from {} to {} characters",
                    text.chars().count(),
                    TEXT_MAX_CHARS
                );
                self.buf.put_slice(&text.as_bytes()[..cut]);
                true
            }
            None => {
                self.buf.put_slice(text.as_bytes());
                false
            }
        }
    }

    /// Append raw payload bytes
    pub fn raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.put_slice(data);
        self
    }

    /// Borrow the frame body (opcode and operands)
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
