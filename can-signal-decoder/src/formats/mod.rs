//! Log file format parsers
//!
//! Each parser yields an iterator over CanFrame objects.

pub mod candump;

// Re-export parser types
pub use candump::{CandumpFrameIterator, CandumpParser};
