//! LD2413 configuration commands and acknowledgements.
//!
//! A command is carried in a config frame whose payload is the 16-bit opcode
//! followed by its arguments:
//!
//! ```text
//! FD FC FB FA | u16_le(2 + len(args)) | u16_le(opcode) | args | 04 03 02 01
//! ```
//!
//! The sensor answers with a config frame whose payload starts with the same
//! opcode.

use arrayvec::ArrayVec;
use heapless::Vec;

use super::frame::{Frame, FrameKind, CONFIG_FOOTER, CONFIG_HEADER, MAX_PAYLOAD_SIZE};
use super::timing::{REPORT_PERIOD_MAX_MS, REPORT_PERIOD_MIN_MS};

/// Command words understood by the sensor.
pub mod opcode {
    pub const ENABLE_CONFIG: u16 = 0x00FF;
    pub const END_CONFIG: u16 = 0x00FE;
    pub const READ_FIRMWARE_VERSION: u16 = 0x0000;
    pub const READ_REPORT_PERIOD: u16 = 0x0070;
    pub const SET_REPORT_PERIOD: u16 = 0x0071;
    pub const SET_MIN_DISTANCE: u16 = 0x0074;
    pub const SET_MAX_DISTANCE: u16 = 0x0075;
    pub const FACTORY_RESET: u16 = 0x00A2;
}

/// Maximum argument bytes a command may carry.
pub const MAX_COMMAND_ARGS: usize = 8;

/// Header + length + opcode + args + footer.
pub const MAX_COMMAND_FRAME: usize = 4 + 2 + 2 + MAX_COMMAND_ARGS + 4;

/// Argument value sent with `ENABLE_CONFIG`.
const ENABLE_CONFIG_VALUE: u16 = 0x0001;

/// A configuration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCommand {
    opcode: u16,
    args: ArrayVec<u8, MAX_COMMAND_ARGS>,
}

impl ConfigCommand {
    /// Builds a command with no arguments.
    pub fn new(opcode: u16) -> Self {
        ConfigCommand { opcode, args: ArrayVec::new() }
    }

    /// Builds a command with raw argument bytes.
    ///
    /// Returns `None` if `args` is longer than [`MAX_COMMAND_ARGS`].
    pub fn with_args(opcode: u16, args: &[u8]) -> Option<Self> {
        let mut buf = ArrayVec::new();
        buf.try_extend_from_slice(args).ok()?;
        Some(ConfigCommand { opcode, args: buf })
    }

    fn with_u16(opcode: u16, value: u16) -> Self {
        let mut args = ArrayVec::new();
        args.extend(value.to_le_bytes());
        ConfigCommand { opcode, args }
    }

    pub fn enable_config() -> Self {
        Self::with_u16(opcode::ENABLE_CONFIG, ENABLE_CONFIG_VALUE)
    }

    pub fn end_config() -> Self {
        Self::new(opcode::END_CONFIG)
    }

    /// Report period in milliseconds, clamped to the range the sensor accepts.
    pub fn set_report_period(period_ms: u16) -> Self {
        let period = period_ms.clamp(REPORT_PERIOD_MIN_MS, REPORT_PERIOD_MAX_MS);
        Self::with_u16(opcode::SET_REPORT_PERIOD, period)
    }

    pub fn set_min_distance(mm: u16) -> Self {
        Self::with_u16(opcode::SET_MIN_DISTANCE, mm)
    }

    pub fn set_max_distance(mm: u16) -> Self {
        Self::with_u16(opcode::SET_MAX_DISTANCE, mm)
    }

    pub fn factory_reset() -> Self {
        Self::new(opcode::FACTORY_RESET)
    }

    #[inline]
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    #[inline]
    pub fn args(&self) -> &[u8] {
        &self.args
    }

    /// Serializes the command into a complete config frame.
    pub fn encode(&self) -> ArrayVec<u8, MAX_COMMAND_FRAME> {
        let mut out = ArrayVec::new();
        let len = 2 + self.args.len() as u16;
        // Capacity covers the largest command, so none of these can overflow.
        out.extend(CONFIG_HEADER);
        out.extend(len.to_le_bytes());
        out.extend(self.opcode.to_le_bytes());
        out.extend(self.args.iter().copied());
        out.extend(CONFIG_FOOTER);
        out
    }
}

/// The sensor's answer to a [`ConfigCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigAck {
    opcode: u16,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl ConfigAck {
    /// Interprets a config frame as an acknowledgement.
    ///
    /// Returns `None` for report frames and for payloads too short to carry an opcode.
    pub fn from_frame(frame: Frame) -> Option<Self> {
        if frame.kind() != FrameKind::Config || frame.payload().len() < 2 {
            return None;
        }
        let opcode = u16::from_le_bytes([frame.payload()[0], frame.payload()[1]]);
        let mut payload = Vec::new();
        payload.extend_from_slice(frame.payload()).ok()?;
        Some(ConfigAck { opcode, payload })
    }

    /// The echoed command word.
    #[inline]
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// Full acknowledgement payload, echoed opcode included.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Bytes following the echoed opcode.
    #[inline]
    pub fn args(&self) -> &[u8] {
        &self.payload[2..]
    }
}

/// Parameters the sensor can report back but whose answer layout is not documented.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadBack {
    FirmwareVersion,
    ReportPeriod,
    MinDistance,
    MaxDistance,
}

impl ReadBack {
    /// Command word used to request the value, where one is known.
    pub fn opcode(self) -> Option<u16> {
        match self {
            ReadBack::FirmwareVersion => Some(opcode::READ_FIRMWARE_VERSION),
            ReadBack::ReportPeriod => Some(opcode::READ_REPORT_PERIOD),
            ReadBack::MinDistance | ReadBack::MaxDistance => None,
        }
    }
}

impl core::fmt::Display for ReadBack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ReadBack::FirmwareVersion => "firmware version",
            ReadBack::ReportPeriod => "report period",
            ReadBack::MinDistance => "min distance",
            ReadBack::MaxDistance => "max distance",
        };
        f.write_str(name)
    }
}
