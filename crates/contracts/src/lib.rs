//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Capture timestamps are producer-supplied (seconds, f64) as primary clock
//! - `0.0` is the epoch value for "never observed" in freshness gates

mod config;
mod error;
mod frame;
mod frame_id;
mod message;
mod sensor;
mod sink;

pub use config::*;
pub use error::*;
pub use frame::*;
pub use frame_id::FrameId;
pub use message::*;
pub use sensor::*;
pub use sink::*;
