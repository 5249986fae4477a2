// src/common/timing.rs

use core::time::Duration;

// === Command/Response Timing ===

/// How long a configuration command waits for its acknowledgement unless told otherwise.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(1000);
/// Delay between empty polls of the stream while a command waits.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(100);
/// Upper bound for writing one command frame and flushing it.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(50);

// === Connection Tracking ===

/// A session with no frame for this long is reported as disconnected.
pub const CONNECTION_STALE_AFTER: Duration = Duration::from_millis(3000);

// === Report Period Bounds ===

/// Shortest report period the sensor accepts, in milliseconds.
pub const REPORT_PERIOD_MIN_MS: u16 = 50;
/// Longest report period the sensor accepts, in milliseconds.
pub const REPORT_PERIOD_MAX_MS: u16 = 1000;

/// Whole milliseconds in `d`, saturating at `u32::MAX`.
#[inline]
pub(crate) fn as_millis_u32(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

/// Whole microseconds in `d`, saturating at `u32::MAX`.
#[inline]
pub(crate) fn as_micros_u32(d: Duration) -> u32 {
    u32::try_from(d.as_micros()).unwrap_or(u32::MAX)
}
