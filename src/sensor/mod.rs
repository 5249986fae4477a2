// src/sensor/mod.rs

//! The sensor session: polling of the report stream plus the configuration commands.

mod config;
mod io_helpers;
mod transaction;

#[cfg(test)]
pub(crate) mod mock;

pub use config::SessionConfig;

use crate::common::{
    error::Ld2413Error,
    frame::{Frame, FrameKind},
    hal_traits::{Ld2413Serial, Ld2413Timer},
    parser::FrameScanner,
    report::{decode_distance, DistanceReading},
    timing,
};

/// A session with one LD2413 sensor.
///
/// [`update`](Self::update) must be called regularly to consume the report
/// stream. Configuration methods take over the stream until they finish, and
/// since both need `&mut self` they can never overlap on one session.
#[derive(Debug)]
pub struct Ld2413<IF>
where
    IF: Ld2413Serial + Ld2413Timer,
{
    interface: IF,
    config: SessionConfig,
    scanner: FrameScanner,
    reading: Option<DistanceReading>,
    new_data: bool,
    last_packet_at: Option<u32>,
    config_mode: bool,
}

impl<IF> Ld2413<IF>
where
    IF: Ld2413Serial + Ld2413Timer,
{
    pub fn new(interface: IF) -> Self {
        Self::with_config(interface, SessionConfig::default())
    }

    pub fn with_config(interface: IF, config: SessionConfig) -> Self {
        log::info!("ld2413: session initialized");
        Ld2413 {
            interface,
            config,
            scanner: FrameScanner::background(),
            reading: None,
            new_data: false,
            last_packet_at: None,
            config_mode: false,
        }
    }

    /// Releases the underlying interface.
    pub fn release(self) -> IF {
        self.interface
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_command_timeout(&mut self, timeout: core::time::Duration) {
        self.config.command_timeout = timeout;
    }

    /// Consumes every byte currently available and processes completed frames.
    ///
    /// Never waits for data. I/O errors are returned after any frames read
    /// before them have been applied.
    pub fn update(&mut self) -> Result<(), Ld2413Error<IF::Error>> {
        loop {
            let byte = match self.interface.read_byte() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(Ld2413Error::Io(e)),
            };
            if let Some(frame) = self.scanner.feed(byte) {
                self.process_frame(&frame);
            }
        }
    }

    fn process_frame(&mut self, frame: &Frame) {
        let now = self.interface.now_ms();
        match frame.kind() {
            FrameKind::Report => {
                // Reports of any other length are ignored, keeping the previous reading.
                if let Some(millimeters) = decode_distance(frame) {
                    self.reading = Some(DistanceReading { millimeters, observed_at_ms: now });
                    self.new_data = true;
                    self.last_packet_at = Some(now);
                }
            }
            FrameKind::Config => {
                log::debug!("ld2413: received config frame ({} bytes)", frame.length());
                self.last_packet_at = Some(now);
            }
        }
    }

    /// True if a reading arrived since the last call. Clears the flag.
    pub fn has_new_data(&mut self) -> bool {
        core::mem::take(&mut self.new_data)
    }

    /// Last distance in millimetres, `0.0` before the first report.
    pub fn distance_mm(&self) -> f32 {
        self.reading.map_or(0.0, |r| r.millimeters)
    }

    /// Last distance in metres, `0.0` before the first report.
    pub fn distance_m(&self) -> f32 {
        self.distance_mm() / 1000.0
    }

    #[inline]
    pub fn reading(&self) -> Option<DistanceReading> {
        self.reading
    }

    /// True if a frame arrived within the last three seconds.
    pub fn is_connected(&self) -> bool {
        let stale_after = timing::as_millis_u32(timing::CONNECTION_STALE_AFTER);
        self.last_packet_at
            .is_some_and(|at| self.interface.now_ms().wrapping_sub(at) < stale_after)
    }

    #[inline]
    pub fn is_config_mode(&self) -> bool {
        self.config_mode
    }
}
