// src/common/report.rs

use super::frame::{Frame, FrameKind};

/// Payload length of a distance report.
pub const DISTANCE_PAYLOAD_LEN: usize = 4;

/// A distance measurement and the clock reading at which it was decoded.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DistanceReading {
    pub millimeters: f32,
    pub observed_at_ms: u32,
}

impl DistanceReading {
    #[inline]
    pub fn meters(&self) -> f32 {
        self.millimeters / 1000.0
    }
}

/// Extracts the distance in millimetres from a report frame.
///
/// The payload is a little-endian IEEE-754 `f32`. Config frames and report
/// frames of any other length yield `None`.
pub fn decode_distance(frame: &Frame) -> Option<f32> {
    if frame.kind() != FrameKind::Report {
        return None;
    }
    let bytes: [u8; DISTANCE_PAYLOAD_LEN] = frame.payload().try_into().ok()?;
    Some(f32::from_le_bytes(bytes))
}
