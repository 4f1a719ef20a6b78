//! CAN Signal Decoder Library
//!
//! Decodes raw CAN frame payloads into named, scaled physical values following
//! the bit-layout and scaling conventions of DBC signal databases.
//!
//! # Architecture
//!
//! - [`signals::bits`] extracts unsigned fields of 1 to 64 bits from a payload
//! - [`SignalSpec`] maps both DBC bit-addressing conventions onto the
//!   extractor, sign-extends, scales and renders its `SG_` record
//! - [`MessageDefinition`] groups the signals of one frame and the
//!   [`Decoder`] looks them up by CAN ID
//! - [`entries`] turns decoded frames into time series for viewers
//!
//! Everything is immutable once loaded; decoding never mutates shared state.
//!
//! # Example Usage
//!
//! ```
//! use can_signal_decoder::{ByteOrder, SignalSpec};
//!
//! let torque = SignalSpec::builder("Torque")
//!     .with_layout(7, 16)
//!     .with_byte_order(ByteOrder::BigEndian)
//!     .with_scaling(0.5, 0.0)
//!     .with_unit("Nm")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(torque.decode(&[0xFF, 0x38]).unwrap(), -100.0);
//! assert_eq!(
//!     torque.text(),
//!     "SG_ Torque : 7|16@0- (0.5,0) [-16384|16383.5] \"Nm\" XXX"
//! );
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod entries;
pub mod formats;
pub mod signals;
pub mod types;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::{DatabaseStats, Decoder};
pub use entries::{Entry, PlotPoint};
pub use message_decoder::MessageDecoder;
pub use signals::{
    big_endian_bit_index, BitDescription, ByteOrder, MessageDefinition, Multiplex, SignalConfig,
    SignalDatabase, SignalSpec,
};
pub use types::{
    CanFrame, DecodedEvent, DecodedSignal, DecoderError, Result, SignalFailure, Timestamp,
};

// Internal modules (not exposed in public API)
mod message_decoder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can create a decoder
        let decoder = Decoder::new();
        let stats = decoder.database_stats();
        assert_eq!(stats.num_messages, 0);
        assert!(!VERSION.is_empty());
    }
}
