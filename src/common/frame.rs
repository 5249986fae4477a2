// src/common/frame.rs

//! Frame alphabets and the completed-frame type.
//!
//! The LD2413 uses two framings that differ only in their header and footer:
//!
//! ```text
//! Report: F4 F3 F2 F1 | len_lo len_hi | payload[len] | F8 F7 F6 F5
//! Config: FD FC FB FA | len_lo len_hi | payload[len] | 04 03 02 01
//! ```
//!
//! There is no checksum. Integrity comes from the header, length and footer.

use heapless::Vec;

/// Report frame header (sensor -> host telemetry).
pub const REPORT_HEADER: [u8; 4] = [0xF4, 0xF3, 0xF2, 0xF1];
/// Report frame footer.
pub const REPORT_FOOTER: [u8; 4] = [0xF8, 0xF7, 0xF6, 0xF5];

/// Config frame header (commands and acknowledgements).
pub const CONFIG_HEADER: [u8; 4] = [0xFD, 0xFC, 0xFB, 0xFA];
/// Config frame footer.
pub const CONFIG_FOOTER: [u8; 4] = [0x04, 0x03, 0x02, 0x01];

/// Largest payload length accepted from the wire. Anything above is treated as corrupt.
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Which of the two framings a frame was received in.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Unsolicited distance telemetry.
    Report,
    /// Configuration command or acknowledgement.
    Config,
}

impl FrameKind {
    pub const fn header(self) -> &'static [u8; 4] {
        match self {
            FrameKind::Report => &REPORT_HEADER,
            FrameKind::Config => &CONFIG_HEADER,
        }
    }

    pub const fn footer(self) -> &'static [u8; 4] {
        match self {
            FrameKind::Report => &REPORT_FOOTER,
            FrameKind::Config => &CONFIG_FOOTER,
        }
    }

    /// Returns the kind whose header starts with `byte`, if it is one of `accepted`.
    pub fn from_lead_byte(byte: u8, accepted: &[FrameKind]) -> Option<Self> {
        accepted.iter().copied().find(|kind| kind.header()[0] == byte)
    }
}

/// A fully validated frame.
///
/// Only the scanner builds these, so `length() <= MAX_PAYLOAD_SIZE` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    kind: FrameKind,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    pub(crate) fn new(kind: FrameKind, payload: Vec<u8, MAX_PAYLOAD_SIZE>) -> Self {
        Frame { kind, payload }
    }

    #[inline]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length as declared on the wire, which always equals the payload length.
    #[inline]
    pub fn length(&self) -> u16 {
        self.payload.len() as u16
    }
}
