/*!
Handshake state machine.

Before any drawing command the host sends the handshake opcode and waits for
the controller to answer `AA 00 'O' 'K'`. Reply bytes are consumed one at a
time: anything before the 0xAA start marker is discarded, then up to four
header bytes are collected until the reply is complete or the deadline passes.
*/

use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::channel::Channel;
use crate::config::SessionConfig;
use crate::error::{DwinError, Result};

/// Start marker of every reply from the controller
pub const START_MARKER: u8 = 0xAA;

/// Reply bytes kept per attempt
pub const RECEIVE_CAPACITY: usize = 26;

/// Reply header length: marker, status, 'O', 'K'
const HEADER_LEN: usize = 4;

/// Handshake progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing sent yet
    Idle,
    /// Request sent, discarding bytes until 0xAA arrives
    AwaitingMarker,
    /// Marker seen, collecting the rest of the header
    CollectingHeader,
    /// Device answered correctly
    Accepted,
    /// Device answered with the wrong bytes
    Rejected,
    /// Deadline passed without a usable reply
    TimedOut,
}

impl HandshakeState {
    /// True once no more input will change the outcome
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::TimedOut)
    }
}

/// Byte-at-a-time reply parser for one handshake attempt
#[derive(Debug, Clone)]
pub struct HandshakeReader {
    state: HandshakeState,
    received: Vec<u8>,
    discarded: usize,
    require_ok: bool,
}

impl HandshakeReader {
    /// Create an idle reader.
    ///
    /// With `require_ok` unset a reply that stops after three bytes
    /// (`AA 00 xx`) is still accepted once the deadline passes.
    pub fn new(require_ok: bool) -> Self {
        Self {
            state: HandshakeState::Idle,
            received: Vec::with_capacity(RECEIVE_CAPACITY),
            discarded: 0,
            require_ok,
        }
    }

    /// Reset and begin waiting for the start marker
    pub fn start(&mut self) {
        self.received.clear();
        self.discarded = 0;
        self.state = HandshakeState::AwaitingMarker;
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Reply bytes collected so far, marker first
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Bytes thrown away while waiting for the marker
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Consume one reply byte
    pub fn feed(&mut self, byte: u8) -> HandshakeState {
        match self.state {
            HandshakeState::AwaitingMarker => {
                if byte == START_MARKER {
                    self.received.push(byte);
                    self.state = HandshakeState::CollectingHeader;
                } else {
                    self.discarded += 1;
                }
            }
            HandshakeState::CollectingHeader => {
                self.received.push(byte);
                if self.received.len() >= HEADER_LEN {
                    self.state = self.evaluate();
                }
            }
            _ => {}
        }
        self.state
    }

    /// Deadline reached; settle on a final state
    pub fn expire(&mut self) -> HandshakeState {
        if !self.state.is_finished() {
            self.state = match self.received.len() {
                n if n < 3 => HandshakeState::TimedOut,
                _ if self.received[1] != 0x00 => HandshakeState::Rejected,
                _ if self.require_ok => HandshakeState::TimedOut,
                _ => {
                    warn!(
                        "Accepting short handshake reply {} without OK bytes",
                        hex::encode(&self.received)
                    );
                    HandshakeState::Accepted
                }
            };
        }
        self.state
    }

    fn evaluate(&self) -> HandshakeState {
        match self.received.as_slice() {
            [START_MARKER, 0x00, b'O', b'K', ..] => HandshakeState::Accepted,
            _ => HandshakeState::Rejected,
        }
    }
}

/// Bounded retry around a fallible operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Run `op` until it succeeds or the attempts run out.
    ///
    /// `op` receives the 1-based attempt number. Exhaustion is reported as
    /// [`DwinError::HandshakeExhausted`]; individual failures are logged.
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let attempts = self.max_attempts.max(1);
        for attempt in 1..=attempts {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("Handshake attempt {}/{} failed: {}", attempt, attempts, e);
                    if attempt < attempts {
                        thread::sleep(self.delay);
                    }
                }
            }
        }
        Err(DwinError::HandshakeExhausted { attempts })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        SessionConfig::default().retry_policy()
    }
}

/// Run one handshake attempt over `channel`.
///
/// `request` is the complete wire frame for the handshake opcode. Stale input
/// is drained first; the reply is then polled until accepted, rejected or the
/// configured deadline passes.
pub fn exchange<C: Channel + ?Sized>(
    channel: &mut C,
    request: &[u8],
    config: &SessionConfig,
) -> Result<()> {
    if !channel.is_open() {
        return Err(DwinError::NotOpen);
    }

    let mut reader = HandshakeReader::new(config.require_ok);
    reader.start();

    if channel.bytes_available()? > 0 {
        channel.clear_input()?;
    }
    channel.write_all(request)?;
    channel.flush()?;
    debug!("Handshake request sent: {}", hex::encode(request));

    let deadline = Instant::now() + config.handshake_timeout();
    while !reader.state().is_finished() {
        if Instant::now() >= deadline {
            reader.expire();
            break;
        }
        if channel.bytes_available()? == 0 {
            thread::sleep(config.handshake_poll());
            continue;
        }
        if let Some(byte) = channel.read_byte()? {
            reader.feed(byte);
        }
    }

    if reader.discarded() > 0 {
        debug!("Discarded {} bytes before handshake marker", reader.discarded());
    }

    match reader.state() {
        HandshakeState::Accepted => {
            info!("Handshake accepted: {}", hex::encode(reader.received()));
            Ok(())
        }
        HandshakeState::Rejected => Err(DwinError::ProtocolRejected(reader.received().to_vec())),
        _ => Err(DwinError::HandshakeTimedOut {
            received: reader.received().len(),
        }),
    }
}
