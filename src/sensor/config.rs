// src/sensor/config.rs

use crate::common::timing;
use core::time::Duration;

/// Runtime settings for a sensor session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a configuration command waits for its acknowledgement.
    pub command_timeout: Duration,
    /// Delay between empty polls while a command waits.
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout: timing::DEFAULT_COMMAND_TIMEOUT,
            poll_interval: timing::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SessionConfig {
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
