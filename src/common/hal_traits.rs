// src/common/hal_traits.rs

use core::fmt::Debug;

/// Abstraction for the clock and short delays the driver needs.
pub trait Ld2413Timer {
    /// Milliseconds from a monotonic source. Wrap-around is handled by the driver.
    fn now_ms(&self) -> u32;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);
}

/// Abstraction for the duplex byte stream connected to the sensor.
pub trait Ld2413Serial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to read a single byte from the serial interface.
    ///
    /// Returns `Ok(byte)` if a byte was read, or `Err(nb::Error::WouldBlock)`
    /// if no byte is available yet. This is how the driver polls for
    /// available data, so it must never block.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte to the serial interface.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if the write buffer is full.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Adapts an `embedded-io` UART and a timer into an interface the driver accepts.
///
/// The UART must implement `ReadReady` so reads can be polled without blocking.
#[cfg(feature = "impl-native")]
#[derive(Debug)]
pub struct NativeInterface<U, T> {
    uart: U,
    timer: T,
}

#[cfg(feature = "impl-native")]
impl<U, T> NativeInterface<U, T> {
    pub fn new(uart: U, timer: T) -> Self {
        NativeInterface { uart, timer }
    }

    /// Returns the UART and timer.
    pub fn free(self) -> (U, T) {
        (self.uart, self.timer)
    }
}

#[cfg(feature = "impl-native")]
impl<U, T> Ld2413Serial for NativeInterface<U, T>
where
    U: embedded_io::Read + embedded_io::ReadReady + embedded_io::Write,
{
    type Error = U::Error;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if !self.uart.read_ready().map_err(nb::Error::Other)? {
            return Err(nb::Error::WouldBlock);
        }
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf).map_err(nb::Error::Other)? {
            1 => Ok(buf[0]),
            _ => Err(nb::Error::WouldBlock),
        }
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        match self.uart.write(&[byte]).map_err(nb::Error::Other)? {
            1 => Ok(()),
            _ => Err(nb::Error::WouldBlock),
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.uart.flush().map_err(nb::Error::Other)
    }
}

#[cfg(feature = "impl-native")]
impl<U, T: Ld2413Timer> Ld2413Timer for NativeInterface<U, T> {
    fn now_ms(&self) -> u32 {
        self.timer.now_ms()
    }

    fn delay_us(&mut self, us: u32) {
        self.timer.delay_us(us)
    }
}

/// Builds an [`Ld2413Timer`] from an `embedded-hal` delay and a millisecond counter.
#[cfg(feature = "impl-native")]
#[derive(Debug)]
pub struct HalTimer<D, F> {
    delay: D,
    millis: F,
}

#[cfg(feature = "impl-native")]
impl<D, F> HalTimer<D, F>
where
    D: embedded_hal::delay::DelayNs,
    F: Fn() -> u32,
{
    pub fn new(delay: D, millis: F) -> Self {
        HalTimer { delay, millis }
    }
}

#[cfg(feature = "impl-native")]
impl<D, F> Ld2413Timer for HalTimer<D, F>
where
    D: embedded_hal::delay::DelayNs,
    F: Fn() -> u32,
{
    fn now_ms(&self) -> u32 {
        (self.millis)()
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us)
    }
}
