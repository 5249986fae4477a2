// src/common/error.rs

use super::command::ReadBack;

#[derive(Debug, thiserror::Error)]
pub enum Ld2413Error<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// No matching acknowledgement, or a write did not complete, within the allowed time.
    #[error("Operation timed out")]
    Timeout,

    /// The sensor's answer layout for this parameter is not documented.
    #[error("Reading back the {0} is not supported")]
    Unsupported(ReadBack),
}

impl<E: core::fmt::Debug> Ld2413Error<E> {
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Ld2413Error::Timeout)
    }
}
