//! Core types for the CAN signal decoder library
//!
//! This module defines the frames the decoder consumes, the events it emits
//! and the error type shared by every decoding stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Raw CAN frame as delivered by a log reader or a live interface
///
/// Transport-level framing is already stripped: only the arbitration ID and
/// the payload bytes are left.
#[derive(Debug, Clone, PartialEq)]
pub struct CanFrame {
    /// Timestamp in nanoseconds since epoch
    pub timestamp_ns: u64,
    /// CAN interface name (e.g., "can0", "vcan1")
    pub channel: String,
    /// CAN message ID (11-bit or 29-bit)
    pub can_id: u32,
    /// Frame data bytes (0-8 bytes for classic CAN, up to 64 for CAN-FD)
    pub data: Vec<u8>,
    /// True if this is an extended (29-bit) CAN ID
    pub is_extended: bool,
    /// True if this is a CAN-FD frame
    pub is_fd: bool,
}

impl CanFrame {
    /// Build a classic CAN frame with a zero timestamp on an unnamed channel
    pub fn new(can_id: u32, data: Vec<u8>) -> Self {
        Self {
            timestamp_ns: 0,
            channel: String::new(),
            can_id,
            data,
            is_extended: can_id > 0x7FF,
            is_fd: false,
        }
    }

    /// Convert timestamp from nanoseconds to DateTime<Utc>
    pub fn timestamp(&self) -> Timestamp {
        let secs = (self.timestamp_ns / 1_000_000_000) as i64;
        let nsecs = (self.timestamp_ns % 1_000_000_000) as u32;
        DateTime::from_timestamp(secs, nsecs).unwrap_or_default()
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.data.len()
    }

    /// Payload capacity in bits
    pub fn bit_len(&self) -> usize {
        self.data.len() * 8
    }
}

/// Errors that can occur during decoding
///
/// All of them are recoverable: a failed signal never prevents its siblings
/// in the same frame from being decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error(
        "Bit span out of range: {width} bits at offset {offset} exceed {capacity} available bits"
    )]
    OutOfRange {
        /// Requested start offset (may be negative for a malformed definition)
        offset: i64,
        /// Requested width in bits
        width: u32,
        /// Buffer capacity in bits
        capacity: usize,
    },

    #[error("Invalid signal width: {0} bits")]
    InvalidWidth(u32),

    #[error("Invalid signal set: {0}")]
    InvalidSignalSet(String),

    #[error("Failed to parse DBC: {0}")]
    DbcParseError(String),

    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Main decoded event type - the primary output of the decoder
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEvent {
    /// A CAN frame with a known definition, decoded signal by signal
    Message {
        /// Absolute timestamp of the frame
        timestamp: Timestamp,
        /// CAN interface name
        channel: String,
        /// CAN message ID
        can_id: u32,
        /// Message name from the DBC
        message_name: String,
        /// Successfully decoded signals, in definition order
        signals: Vec<DecodedSignal>,
        /// Signals that could not be decoded from this payload
        failures: Vec<SignalFailure>,
    },

    /// A raw CAN frame (unknown ID, or emitted on request)
    RawFrame {
        /// Absolute timestamp of the frame
        timestamp: Timestamp,
        /// CAN interface name
        channel: String,
        /// CAN message ID
        can_id: u32,
        /// Raw data bytes
        data: Vec<u8>,
        /// True if this is a CAN-FD frame
        is_fd: bool,
    },
}

impl DecodedEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> Timestamp {
        match self {
            DecodedEvent::Message { timestamp, .. } => *timestamp,
            DecodedEvent::RawFrame { timestamp, .. } => *timestamp,
        }
    }

    /// Get the CAN ID of this event
    pub fn can_id(&self) -> u32 {
        match self {
            DecodedEvent::Message { can_id, .. } => *can_id,
            DecodedEvent::RawFrame { can_id, .. } => *can_id,
        }
    }

    /// Decoded signals of a message event, empty for raw frames
    pub fn signals(&self) -> &[DecodedSignal] {
        match self {
            DecodedEvent::Message { signals, .. } => signals,
            DecodedEvent::RawFrame { .. } => &[],
        }
    }
}

/// A decoded signal with its physical value and bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedSignal {
    /// Signal name from the DBC
    pub name: String,
    /// Physical value (raw * factor + offset)
    pub value: f64,
    /// Sign-extended raw value before scaling (bit pattern for float signals)
    pub raw: i128,
    /// Engineering unit (e.g., "km/h", "°C", "V"); empty when unitless
    pub unit: String,
    /// Minimum physical value
    pub min: f64,
    /// Maximum physical value
    pub max: f64,
}

impl fmt::Display for DecodedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} = {}", self.name, self.value)
        } else {
            write!(f, "{} = {} {}", self.name, self.value, self.unit)
        }
    }
}

/// A signal that failed to decode, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFailure {
    /// Signal name from the DBC
    pub name: String,
    /// Rendered error
    pub reason: String,
}
