//! # Solarpack FFI
//!
//! C FFI interface for the solarpack module packing engine.
//!
//! Requests and responses are JSON strings, so the engine can be driven
//! from map front ends written in other languages.

mod api;
mod types;

pub use api::*;
pub use types::*;
