// src/common/parser.rs

//! Byte-at-a-time frame scanner shared by the background poller and the
//! acknowledgement wait.
//!
//! The control flow lives in [`ScanState::next`], a pure function of the
//! current state and one input byte. [`FrameScanner`] owns the payload buffer
//! and applies the [`Step`] each transition asks for. Both consumers build their
//! own scanner from a [`ScanRules`] value, so they never share in-flight state.

use super::frame::{Frame, FrameKind, MAX_PAYLOAD_SIZE};
use heapless::Vec;

/// Whether a scanner checks the 4-byte footer before emitting a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FooterPolicy {
    /// Frame is emitted only after the footer of its alphabet has been matched.
    Verify,
    /// Frame is emitted as soon as the declared payload has been read.
    Skip,
}

/// Parameters that distinguish one scanner instance from another.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScanRules {
    /// Alphabets whose header may start a frame.
    pub accepted: &'static [FrameKind],
    pub footer: FooterPolicy,
}

impl ScanRules {
    /// Rules for the non-blocking `update` path: both framings, footers verified.
    pub const BACKGROUND: ScanRules = ScanRules {
        accepted: &[FrameKind::Report, FrameKind::Config],
        footer: FooterPolicy::Verify,
    };

    /// Rules for the acknowledgement wait: config framing only, footers not checked.
    pub const ACKNOWLEDGEMENTS: ScanRules = ScanRules {
        accepted: &[FrameKind::Config],
        footer: FooterPolicy::Skip,
    };
}

/// Position in the frame grammar.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    /// Waiting for the lead byte of a header.
    Idle,
    /// `matched` header bytes (1..=3) of `kind` have been seen.
    Header { kind: FrameKind, matched: u8 },
    LengthLow { kind: FrameKind },
    LengthHigh { kind: FrameKind, low: u8 },
    /// `received` of `len` payload bytes have been stored.
    Payload { kind: FrameKind, len: u16, received: u16 },
    /// `matched` footer bytes (0..=3) have been seen.
    Footer { kind: FrameKind, matched: u8 },
}

/// Side effect requested by a transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Nothing,
    /// Append the byte to the payload buffer.
    Store(u8),
    /// Append the byte, then emit the buffered payload as a frame.
    StoreThenComplete(u8, FrameKind),
    /// Emit the buffered payload as a frame.
    Complete(FrameKind),
    /// Drop the in-flight frame.
    Reject(Reject),
}

/// Why an in-flight frame was dropped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reject {
    /// Unexpected byte at a header or footer position.
    Desync { byte: u8 },
    /// Declared length above [`MAX_PAYLOAD_SIZE`].
    Oversized(u16),
}

impl ScanState {
    /// Computes the next state for one input byte.
    ///
    /// A byte that breaks a header or footer is consumed by the reset; it is
    /// never re-examined as the start of a new frame.
    pub fn next(self, byte: u8, rules: &ScanRules) -> (ScanState, Step) {
        match self {
            ScanState::Idle => match FrameKind::from_lead_byte(byte, rules.accepted) {
                Some(kind) => (ScanState::Header { kind, matched: 1 }, Step::Nothing),
                None => (ScanState::Idle, Step::Nothing),
            },

            ScanState::Header { kind, matched } => {
                if kind.header()[matched as usize] != byte {
                    return (ScanState::Idle, Step::Reject(Reject::Desync { byte }));
                }
                if matched as usize + 1 == kind.header().len() {
                    (ScanState::LengthLow { kind }, Step::Nothing)
                } else {
                    (ScanState::Header { kind, matched: matched + 1 }, Step::Nothing)
                }
            }

            ScanState::LengthLow { kind } => (ScanState::LengthHigh { kind, low: byte }, Step::Nothing),

            ScanState::LengthHigh { kind, low } => {
                let len = u16::from_le_bytes([low, byte]);
                if len as usize > MAX_PAYLOAD_SIZE {
                    (ScanState::Idle, Step::Reject(Reject::Oversized(len)))
                } else if len > 0 {
                    (ScanState::Payload { kind, len, received: 0 }, Step::Nothing)
                } else {
                    match rules.footer {
                        FooterPolicy::Verify => (ScanState::Footer { kind, matched: 0 }, Step::Nothing),
                        FooterPolicy::Skip => (ScanState::Idle, Step::Complete(kind)),
                    }
                }
            }

            ScanState::Payload { kind, len, received } => {
                let received = received + 1;
                if received < len {
                    (ScanState::Payload { kind, len, received }, Step::Store(byte))
                } else {
                    match rules.footer {
                        FooterPolicy::Verify => {
                            (ScanState::Footer { kind, matched: 0 }, Step::Store(byte))
                        }
                        FooterPolicy::Skip => {
                            (ScanState::Idle, Step::StoreThenComplete(byte, kind))
                        }
                    }
                }
            }

            ScanState::Footer { kind, matched } => {
                if kind.footer()[matched as usize] != byte {
                    return (ScanState::Idle, Step::Reject(Reject::Desync { byte }));
                }
                if matched as usize + 1 == kind.footer().len() {
                    (ScanState::Idle, Step::Complete(kind))
                } else {
                    (ScanState::Footer { kind, matched: matched + 1 }, Step::Nothing)
                }
            }
        }
    }
}

/// Incremental frame scanner holding at most one frame in flight.
#[derive(Debug, Clone)]
pub struct FrameScanner {
    rules: ScanRules,
    state: ScanState,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl FrameScanner {
    pub fn new(rules: ScanRules) -> Self {
        FrameScanner {
            rules,
            state: ScanState::Idle,
            buffer: Vec::new(),
        }
    }

    /// Scanner used by the session's polling path.
    pub fn background() -> Self {
        Self::new(ScanRules::BACKGROUND)
    }

    /// Scanner used while waiting for a command acknowledgement.
    pub fn acknowledgements() -> Self {
        Self::new(ScanRules::ACKNOWLEDGEMENTS)
    }

    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == ScanState::Idle
    }

    /// Number of payload bytes currently buffered.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any frame in flight.
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
        self.buffer.clear();
    }

    /// Feeds one byte. Returns a frame when this byte completes one.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        let (state, step) = self.state.next(byte, &self.rules);
        self.state = state;

        match step {
            Step::Nothing => None,
            Step::Store(b) => {
                self.store(b);
                None
            }
            Step::StoreThenComplete(b, kind) => {
                self.store(b);
                Some(self.take(kind))
            }
            Step::Complete(kind) => Some(self.take(kind)),
            Step::Reject(reason) => {
                match reason {
                    Reject::Desync { byte } => {
                        log::trace!("ld2413: resync, dropped {:#04x}", byte)
                    }
                    Reject::Oversized(len) => {
                        log::debug!("ld2413: frame length {} exceeds {}, discarded", len, MAX_PAYLOAD_SIZE)
                    }
                }
                self.buffer.clear();
                None
            }
        }
    }

    /// Feeds bytes until the first complete frame. Bytes after it are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Option<Frame> {
        bytes.iter().find_map(|&byte| self.feed(byte))
    }

    fn store(&mut self, byte: u8) {
        // Cannot overflow: the declared length was checked against the capacity.
        let _ = self.buffer.push(byte);
    }

    fn take(&mut self, kind: FrameKind) -> Frame {
        Frame::new(kind, core::mem::take(&mut self.buffer))
    }
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::background()
    }
}
