/*!
Byte channel abstraction.

The session talks to the display through a [`Channel`]: a duplex byte stream
with open/closed state, read/write timeouts and an input buffer that can be
cleared. The serial implementation lives with the application; this module
also provides [`MemoryChannel`], an in-memory channel used by tests and dry
runs.
*/

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Duplex byte channel to the display controller
pub trait Channel: Send {
    /// Whether the channel can still carry bytes
    fn is_open(&self) -> bool;

    /// Write every byte or fail
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Push buffered output to the device
    fn flush(&mut self) -> io::Result<()>;

    /// Bytes waiting in the input buffer
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read a single byte, `None` if the read timed out with nothing received
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Discard any stale input
    fn clear_input(&mut self) -> io::Result<()>;

    /// Configure read and write timeouts
    fn set_timeouts(&mut self, read: Duration, write: Duration) -> io::Result<()>;

    /// Close the channel; later writes fail
    fn close(&mut self) -> io::Result<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    open: bool,
    written: Vec<u8>,
    writes: Vec<Vec<u8>>,
    input: VecDeque<u8>,
    reply: Option<(Vec<u8>, Vec<u8>)>,
    fail_writes: bool,
    read_timeout: Duration,
    write_timeout: Duration,
}

/// In-memory channel.
///
/// Clones share the same state, so a test can keep one handle to inspect the
/// traffic while the session owns another.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryChannel {
    /// Create an open channel with no pending input
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                open: true,
                ..MemoryState::default()
            })),
        }
    }

    /// Queue `reply` as input every time exactly `request` is written
    pub fn with_reply(self, request: &[u8], reply: &[u8]) -> Self {
        self.lock().reply = Some((request.to_vec(), reply.to_vec()));
        self
    }

    /// Append bytes to the input side
    pub fn push_input(&self, bytes: &[u8]) {
        self.lock().input.extend(bytes.iter().copied());
    }

    /// Make every later write fail with a timeout
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Everything written so far, concatenated
    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Each `write_all` call as a separate chunk
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// Drop recorded output
    pub fn clear_written(&self) {
        let mut state = self.lock();
        state.written.clear();
        state.writes.clear();
    }

    /// Timeouts last configured through [`Channel::set_timeouts`]
    pub fn timeouts(&self) -> (Duration, Duration) {
        let state = self.lock();
        (state.read_timeout, state.write_timeout)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A test that panicked mid-write still leaves inspectable state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for MemoryChannel {
    fn is_open(&self) -> bool {
        self.lock().open
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        if !state.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "channel closed"));
        }
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
        }
        state.written.extend_from_slice(buf);
        state.writes.push(buf.to_vec());

        let reply = match &state.reply {
            Some((request, reply)) if request.as_slice() == buf => Some(reply.clone()),
            _ => None,
        };
        if let Some(reply) = reply {
            state.input.extend(reply);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.lock().input.len())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.lock().input.pop_front())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.lock().input.clear();
        Ok(())
    }

    fn set_timeouts(&mut self, read: Duration, write: Duration) -> io::Result<()> {
        let mut state = self.lock();
        state.read_timeout = read;
        state.write_timeout = write;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.lock().open = false;
        Ok(())
    }
}
