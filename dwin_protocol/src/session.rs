/*!
Transport session.

A [`Session`] owns the channel to one display. Every command is built and
flushed while the session lock is held, so frames from concurrent callers
never interleave on the wire. A session only exists after a successful
handshake and the baseline setup commands; closing it (explicitly or on drop)
attempts a best-effort clear screen and ignores any failure doing so.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info, trace, warn};

use crate::channel::Channel;
use crate::commands::Rotation;
use crate::config::SessionConfig;
use crate::encoder::FrameBuilder;
use crate::error::{DwinError, Result};
use crate::handshake;
use crate::palette;
use crate::protocol::{opcode, FRAME_HEADER, TRAILER};

/// Wrap a frame body in the optional header and the trailer
pub fn wire_frame(body: &[u8], with_header: bool) -> Vec<u8> {
    let mut wire = Vec::with_capacity(body.len() + 1 + TRAILER.len());
    if with_header {
        wire.push(FRAME_HEADER);
    }
    wire.extend_from_slice(body);
    wire.extend_from_slice(&TRAILER);
    wire
}

/// Handshaken connection to a display controller
pub struct Session<C: Channel> {
    channel: Mutex<C>,
    initialized: AtomicBool,
    config: SessionConfig,
}

impl<C: Channel> Session<C> {
    /// Handshake with the display and run the baseline setup.
    ///
    /// The handshake is retried according to the config's retry policy. On
    /// any failure the channel is closed and no session is returned.
    pub fn connect(mut channel: C, config: SessionConfig) -> Result<Self> {
        channel.set_timeouts(config.read_timeout(), config.write_timeout())?;

        let session = Self {
            channel: Mutex::new(channel),
            initialized: AtomicBool::new(false),
            config,
        };

        let request = wire_frame(&[opcode::HANDSHAKE], session.config.frame_header);
        session.config.retry_policy().run(|attempt| {
            debug!("Handshake attempt {}", attempt);
            let mut channel = session.lock()?;
            handshake::exchange(&mut *channel, &request, &session.config)
        })?;

        // Not visible to any caller until setup has finished.
        session.initialized.store(true, Ordering::SeqCst);
        if let Err(e) = session.baseline_setup() {
            session.initialized.store(false, Ordering::SeqCst);
            return Err(DwinError::setup(e.to_string()));
        }

        info!("Display session ready");
        Ok(session)
    }

    fn baseline_setup(&self) -> Result<()> {
        self.jpeg_show_and_cache(0)?;
        self.set_direction(Rotation::Deg90)?;
        self.refresh()
    }

    /// Build and flush one frame.
    ///
    /// `build` runs with the session lock held and appends operands after the
    /// opcode. If it fails, nothing is written.
    pub fn send<F>(&self, opcode: u8, build: F) -> Result<()>
    where
        F: FnOnce(&mut FrameBuilder) -> Result<()>,
    {
        if !self.is_initialized() {
            return Err(DwinError::NotReady);
        }

        let mut channel = self.lock()?;
        if !channel.is_open() {
            return Err(DwinError::NotOpen);
        }

        let mut frame = FrameBuilder::new(opcode);
        build(&mut frame)?;
        self.flush_frame(&mut *channel, &frame)
    }

    /// Flush a frame that was built ahead of time
    pub fn send_frame(&self, frame: FrameBuilder) -> Result<()> {
        if !self.is_initialized() {
            return Err(DwinError::NotReady);
        }

        let mut channel = self.lock()?;
        if !channel.is_open() {
            return Err(DwinError::NotOpen);
        }
        self.flush_frame(&mut *channel, &frame)
    }

    fn flush_frame(&self, channel: &mut C, frame: &FrameBuilder) -> Result<()> {
        let wire = wire_frame(frame.as_bytes(), self.config.frame_header);
        trace!("-> {}", hex::encode(&wire));

        if let Err(e) = channel.write_all(&wire).and_then(|_| channel.flush()) {
            warn!("Send of opcode {:#04x} failed: {}", frame.opcode(), e);
            return Err(e.into());
        }

        thread::sleep(self.config.post_send_delay());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, C>> {
        self.channel.lock().map_err(|_| DwinError::LockPoisoned)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Initialized and the channel still open
    pub fn is_connected(&self) -> bool {
        self.is_initialized() && self.lock().map(|c| c.is_open()).unwrap_or(false)
    }

    /// Clear the screen and close the channel.
    ///
    /// Best effort: failures are logged and swallowed. Safe to call more than
    /// once; later sends fail with [`DwinError::NotReady`].
    pub fn close(&self) {
        if self.is_initialized() {
            if let Err(e) = self.clear(palette::BG_BLACK) {
                debug!("Ignoring clear-screen failure during close: {}", e);
            }
        }
        self.initialized.store(false, Ordering::SeqCst);

        match self.lock() {
            Ok(mut channel) if channel.is_open() => match channel.close() {
                Ok(()) => info!("Display channel closed"),
                Err(e) => warn!("Error closing display channel: {}", e),
            },
            Ok(_) => {}
            Err(e) => warn!("Cannot close display channel: {}", e),
        }
    }
}

impl<C: Channel> Drop for Session<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Channel> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("initialized", &self.is_initialized())
            .field("config", &self.config)
            .finish()
    }
}
