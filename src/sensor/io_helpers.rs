// src/sensor/io_helpers.rs

use super::Ld2413;
use crate::common::{
    error::Ld2413Error,
    hal_traits::{Ld2413Serial, Ld2413Timer},
    timing,
};
use core::time::Duration;
use nb::Result as NbResult;

// Implementation block for I/O related helpers
impl<IF> Ld2413<IF>
where
    IF: Ld2413Serial + Ld2413Timer,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout error.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> Result<T, Ld2413Error<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        let start = self.interface.now_ms();
        let budget = timing::as_millis_u32(timeout);
        let poll_us = timing::as_micros_u32(self.config.poll_interval);

        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if self.interface.now_ms().wrapping_sub(start) >= budget {
                        return Err(Ld2413Error::Timeout);
                    }
                    self.interface.delay_us(poll_us);
                }
                Err(nb::Error::Other(e)) => return Err(Ld2413Error::Io(e)),
            }
        }
    }

    /// Discards everything already buffered on the stream.
    ///
    /// Also resets the background scanner, whose in-flight frame (if any) has
    /// just lost its tail. Returns the number of bytes dropped.
    pub(super) fn drain_input(&mut self) -> Result<usize, Ld2413Error<IF::Error>> {
        let mut discarded = 0;
        loop {
            match self.interface.read_byte() {
                Ok(_) => discarded += 1,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(Ld2413Error::Io(e)),
            }
        }
        if discarded > 0 {
            log::trace!("ld2413: drained {} pending bytes", discarded);
        }
        self.scanner.reset();
        Ok(discarded)
    }

    /// Writes `bytes` and flushes, each step bounded by [`timing::WRITE_TIMEOUT`].
    pub(super) fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), Ld2413Error<IF::Error>> {
        for &byte in bytes {
            self.execute_blocking_io_with_timeout(timing::WRITE_TIMEOUT, |iface| {
                iface.write_byte(byte)
            })?;
        }
        self.execute_blocking_io_with_timeout(timing::WRITE_TIMEOUT, |iface| iface.flush())
    }
}
