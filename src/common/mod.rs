// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod parser;
pub mod report;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::{opcode, ConfigAck, ConfigCommand, ReadBack};

// From error.rs
pub use error::Ld2413Error;

// From frame.rs
pub use frame::{Frame, FrameKind, MAX_PAYLOAD_SIZE};

// From hal_traits.rs
pub use hal_traits::{Ld2413Serial, Ld2413Timer};

// From parser.rs
pub use parser::{FooterPolicy, FrameScanner, ScanRules, ScanState};

// From report.rs
pub use report::{decode_distance, DistanceReading};

// Native HAL adapters (from hal_traits.rs)
#[cfg(feature = "impl-native")]
pub use hal_traits::{HalTimer, NativeInterface};
