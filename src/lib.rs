// src/lib.rs

//! Driver for the HLK-LD2413 distance-ranging sensor.
//!
//! The sensor streams distance reports on its UART and accepts configuration
//! commands on the same link. Call [`Ld2413::update`] often to consume the
//! report stream; configuration methods block until the sensor acknowledges
//! or the command timeout passes.
//!
//! ```ignore
//! let mut sensor = Ld2413::new(interface);
//! loop {
//!     sensor.update()?;
//!     if sensor.has_new_data() {
//!         log::info!("distance: {} mm", sensor.distance_mm());
//!     }
//! }
//! ```

#![no_std] // Specify no_std at the crate root
#![deny(unsafe_code)]

pub mod common;
pub mod sensor;

// Re-export key types for convenience
pub use common::{ConfigAck, ConfigCommand, DistanceReading, Ld2413Error, Ld2413Serial, Ld2413Timer, ReadBack};
pub use sensor::{Ld2413, SessionConfig};
