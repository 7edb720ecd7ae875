/*!
Session configuration.
*/

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::handshake::RetryPolicy;

/// Tunables for a display session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix every frame with the 0xAA sync byte
    pub frame_header: bool,

    /// How long one handshake attempt waits for a reply
    pub handshake_timeout_ms: u64,

    /// Sleep between input polls while waiting for the reply
    pub handshake_poll_ms: u64,

    /// Handshake attempts before giving up
    pub handshake_attempts: u32,

    /// Pause between handshake attempts
    pub handshake_retry_delay_ms: u64,

    /// Reject a reply that stops after `AA 00 xx` without the "OK" bytes
    pub require_ok: bool,

    /// Delay after each successful send for device processing
    pub post_send_delay_ms: u64,

    /// Channel read timeout
    pub read_timeout_ms: u64,

    /// Channel write timeout
    pub write_timeout_ms: u64,
}

impl SessionConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn handshake_poll(&self) -> Duration {
        Duration::from_millis(self.handshake_poll_ms)
    }

    pub fn post_send_delay(&self) -> Duration {
        Duration::from_millis(self.post_send_delay_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Retry policy applied around the handshake
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.handshake_attempts.max(1),
            delay: Duration::from_millis(self.handshake_retry_delay_ms),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_header: true,
            handshake_timeout_ms: 2000,
            handshake_poll_ms: 10,
            handshake_attempts: 5,
            handshake_retry_delay_ms: 500,
            require_ok: false,
            post_send_delay_ms: 1,
            read_timeout_ms: 2000,
            write_timeout_ms: 2000,
        }
    }
}
