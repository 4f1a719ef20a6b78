//! DBC file parser
//!
//! Parses Vector DBC text with the `can-dbc` crate and converts it into
//! message definitions and [`SignalSpec`]s.

use crate::signals::database::MessageDefinition;
use crate::signals::spec::{ByteOrder, Multiplex, SignalSpec};
use crate::types::{DecoderError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Skeleton wrapped around a lone `SG_` record so the full grammar accepts it
const SIGNAL_LINE_PREAMBLE: &str =
    "VERSION \"\"\n\nNS_ :\n\nBS_:\n\nBU_: XXX\n\nBO_ 1 Frame: 8 XXX\n ";

/// Parse a DBC file and return message definitions
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageDefinition>> {
    log::info!("Parsing DBC file: {:?}", path);

    // Read the DBC file as bytes first (handle non-UTF8 encodings)
    let bytes = std::fs::read(path).map_err(|e| {
        DecoderError::DbcParseError(format!("Failed to read file {:?}: {}", path, e))
    })?;

    // Try UTF-8 first, then fall back to Latin-1 (compatible with Windows-1252)
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    let messages = parse_dbc_str(&content).map_err(|e| match e {
        DecoderError::DbcParseError(msg) => {
            DecoderError::DbcParseError(format!("{:?}: {}", path, msg))
        }
        other => other,
    })?;

    log::info!("Parsed {} messages from {:?}", messages.len(), path);

    Ok(messages)
}

/// Parse DBC text and return message definitions
pub fn parse_dbc_str(content: &str) -> Result<Vec<MessageDefinition>> {
    let dbc = can_dbc::DBC::from_slice(content.as_bytes())
        .map_err(|e| DecoderError::DbcParseError(format!("{:?}", e)))?;

    let comments = signal_comments(&dbc);
    let floats = float_signals(&dbc);

    dbc.messages()
        .iter()
        .map(|msg| convert_message(msg, &comments, &floats))
        .collect()
}

/// Parse a single `SG_` record, as produced by [`SignalSpec::text`]
pub fn parse_signal_line(line: &str) -> Result<SignalSpec> {
    let content = format!("{}{}\n", SIGNAL_LINE_PREAMBLE, line.trim());
    let dbc = can_dbc::DBC::from_slice(content.as_bytes())
        .map_err(|e| DecoderError::DbcParseError(format!("{:?}", e)))?;

    let signal = dbc
        .messages()
        .first()
        .and_then(|msg| msg.signals().first())
        .ok_or_else(|| {
            DecoderError::DbcParseError(format!("No signal record found in '{}'", line.trim()))
        })?;

    convert_signal(signal, None, false)
}

/// Signal comments keyed by (CAN ID, signal name)
fn signal_comments(dbc: &can_dbc::DBC) -> HashMap<(u32, String), String> {
    dbc.comments()
        .iter()
        .filter_map(|comment| match comment {
            can_dbc::Comment::Signal {
                message_id,
                signal_name,
                comment,
            } => Some(((message_id.0, signal_name.clone()), comment.clone())),
            _ => None,
        })
        .collect()
}

/// Signals marked as IEEE floats by `SIG_VALTYPE_`
fn float_signals(dbc: &can_dbc::DBC) -> HashSet<(u32, String)> {
    dbc.signal_extended_value_type_list()
        .iter()
        .filter(|entry| {
            !matches!(
                entry.signal_extended_value_type(),
                can_dbc::SignalExtendedValueType::SignedOrUnsignedInteger
            )
        })
        .map(|entry| (entry.message_id().0, entry.signal_name().clone()))
        .collect()
}

/// Convert a can-dbc message to our MessageDefinition
fn convert_message(
    dbc_msg: &can_dbc::Message,
    comments: &HashMap<(u32, String), String>,
    floats: &HashSet<(u32, String)>,
) -> Result<MessageDefinition> {
    let id = dbc_msg.message_id().0;

    let signals = dbc_msg
        .signals()
        .iter()
        .map(|sig| {
            let key = (id, sig.name().clone());
            convert_signal(sig, comments.get(&key).cloned(), floats.contains(&key))
        })
        .collect::<Result<Vec<_>>>()?;

    MessageDefinition::new(
        id,
        dbc_msg.message_name().clone(),
        *dbc_msg.message_size() as usize,
        match dbc_msg.transmitter() {
            can_dbc::Transmitter::NodeName(name) => Some(name.clone()),
            can_dbc::Transmitter::VectorXXX => None,
        },
        signals,
    )
}

/// Convert a can-dbc signal to a SignalSpec
fn convert_signal(
    dbc_sig: &can_dbc::Signal,
    comment: Option<String>,
    is_float: bool,
) -> Result<SignalSpec> {
    let byte_order = match *dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let is_signed = matches!(*dbc_sig.value_type(), can_dbc::ValueType::Signed);

    let multiplex = match *dbc_sig.multiplexer_indicator() {
        can_dbc::MultiplexIndicator::Multiplexor => Some(Multiplex::Multiplexor),
        can_dbc::MultiplexIndicator::MultiplexedSignal(value) => {
            Some(Multiplex::Multiplexed(value))
        }
        can_dbc::MultiplexIndicator::MultiplexorAndMultiplexedSignal(value) => {
            Some(Multiplex::MultiplexorAndMultiplexed(value))
        }
        can_dbc::MultiplexIndicator::Plain => None,
    };

    let start_bit = u32::try_from(*dbc_sig.start_bit()).map_err(|_| {
        DecoderError::DbcParseError(format!(
            "Signal '{}' has start bit {} out of range",
            dbc_sig.name(),
            dbc_sig.start_bit()
        ))
    })?;
    let size = u32::try_from(*dbc_sig.signal_size())
        .map_err(|_| DecoderError::InvalidWidth(u32::MAX))?;

    let mut config = SignalSpec::builder(dbc_sig.name().clone())
        .with_layout(start_bit, size)
        .with_byte_order(byte_order)
        .with_signed(is_signed)
        .with_float(is_float)
        .with_scaling(*dbc_sig.factor(), *dbc_sig.offset())
        .with_bounds(*dbc_sig.min(), *dbc_sig.max())
        .with_unit(dbc_sig.unit().clone())
        .with_receivers(dbc_sig.receivers().iter().cloned());
    config.comment = comment;
    config.multiplex = multiplex;

    config.build()
}
