// src/sensor/mock.rs

//! In-memory interface used by the sensor tests.

use crate::common::{
    frame::{CONFIG_FOOTER, CONFIG_HEADER, REPORT_FOOTER, REPORT_HEADER},
    hal_traits::{Ld2413Serial, Ld2413Timer},
};
use heapless::{Deque, Vec};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockCommError;

pub(crate) type Bytes = Vec<u8, 64>;

#[derive(Debug)]
pub(crate) struct MockInterface {
    pub current_time_us: u64,
    pub rx: Deque<u8, 1024>,
    pub tx: Vec<u8, 512>,
    /// Each flush moves the next staged reply into `rx`.
    pub replies: Deque<Bytes, 8>,
    pub flushes: u32,
    pub read_error: bool,
    pub tx_blocked: bool,
}

impl MockInterface {
    pub fn new() -> Self {
        MockInterface {
            current_time_us: 0,
            rx: Deque::new(),
            tx: Vec::new(),
            replies: Deque::new(),
            flushes: 0,
            read_error: false,
            tx_blocked: false,
        }
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.current_time_us = self.current_time_us.saturating_add(ms * 1000);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.current_time_us / 1000
    }

    pub fn stage_read_data(&mut self, data: &[u8]) {
        for &b in data {
            self.rx.push_back(b).unwrap();
        }
    }

    pub fn reply_on_flush(&mut self, data: &[u8]) {
        let mut reply = Bytes::new();
        reply.extend_from_slice(data).unwrap();
        self.replies.push_back(reply).unwrap();
    }
}

impl Ld2413Timer for MockInterface {
    fn now_ms(&self) -> u32 {
        (self.current_time_us / 1000) as u32
    }

    fn delay_us(&mut self, us: u32) {
        self.current_time_us = self.current_time_us.saturating_add(us as u64);
    }
}

impl Ld2413Serial for MockInterface {
    type Error = MockCommError;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if self.read_error {
            return Err(nb::Error::Other(MockCommError));
        }
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if self.tx_blocked {
            return Err(nb::Error::WouldBlock);
        }
        self.tx.push(byte).map_err(|_| nb::Error::Other(MockCommError))
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.flushes += 1;
        if let Some(reply) = self.replies.pop_front() {
            self.stage_read_data(&reply);
        }
        Ok(())
    }
}

/// A report frame carrying `mm` as the distance.
pub(crate) fn report_frame(mm: f32) -> Bytes {
    report_frame_raw(&mm.to_le_bytes())
}

pub(crate) fn report_frame_raw(payload: &[u8]) -> Bytes {
    let mut out = Bytes::new();
    out.extend_from_slice(&REPORT_HEADER).unwrap();
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes()).unwrap();
    out.extend_from_slice(payload).unwrap();
    out.extend_from_slice(&REPORT_FOOTER).unwrap();
    out
}

/// An acknowledgement frame echoing `opcode`, followed by `args`.
pub(crate) fn ack_frame(opcode: u16, args: &[u8]) -> Bytes {
    let mut out = Bytes::new();
    out.extend_from_slice(&CONFIG_HEADER).unwrap();
    out.extend_from_slice(&(2 + args.len() as u16).to_le_bytes()).unwrap();
    out.extend_from_slice(&opcode.to_le_bytes()).unwrap();
    out.extend_from_slice(args).unwrap();
    out.extend_from_slice(&CONFIG_FOOTER).unwrap();
    out
}
