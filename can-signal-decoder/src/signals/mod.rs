//! Signal layout, bit extraction and signal databases
//!
//! This module contains the bit-level decoding core (`bits`, `spec`), the
//! DBC parser and the unified signal database.

pub mod bits;
pub mod database;
pub mod dbc;
pub mod spec;

// Re-export key types for convenience
pub use bits::big_endian_bit_index;
pub use database::{DatabaseStats, MessageDefinition, SignalDatabase};
pub use spec::{BitDescription, ByteOrder, Multiplex, SignalConfig, SignalSpec};
