//! Message Decoding Engine
//!
//! Decodes every signal of a CAN frame against its message definition.
//! Bit extraction and scaling live in [`SignalSpec`]; this layer handles
//! multiplexer selection and keeps one signal's failure from affecting its
//! siblings.

use crate::signals::database::MessageDefinition;
use crate::signals::spec::{Multiplex, SignalSpec};
use crate::types::{CanFrame, DecodedEvent, DecodedSignal, SignalFailure};

/// Message decoder - extracts signals from CAN frames
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode a CAN frame into a DecodedEvent::Message
    ///
    /// Signals that fail to decode are reported in `failures`; multiplexed
    /// signals whose switch value does not match the payload are left out.
    pub fn decode_message(frame: &CanFrame, message_def: &MessageDefinition) -> DecodedEvent {
        let (signals, failures) = Self::decode_signals(&frame.data, message_def);

        DecodedEvent::Message {
            timestamp: frame.timestamp(),
            channel: frame.channel.clone(),
            can_id: frame.can_id,
            message_name: message_def.name().to_string(),
            signals,
            failures,
        }
    }

    /// Decode all active signals of a payload
    pub fn decode_signals(
        data: &[u8],
        message_def: &MessageDefinition,
    ) -> (Vec<DecodedSignal>, Vec<SignalFailure>) {
        let mut decoded = Vec::with_capacity(message_def.signals().len());
        let mut failures = Vec::new();

        let switch_value = Self::multiplexer_value(data, message_def);

        for signal in message_def.signals() {
            if !Self::is_active(signal, switch_value) {
                log::trace!("Skipping inactive multiplexed signal '{}'", signal.name());
                continue;
            }

            match Self::decode_signal(data, signal) {
                Ok(value) => decoded.push(value),
                Err(e) => {
                    log::warn!(
                        "Failed to decode signal '{}' of message '{}' (0x{:X}): {}",
                        signal.name(),
                        message_def.name(),
                        message_def.id(),
                        e
                    );
                    failures.push(SignalFailure {
                        name: signal.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (decoded, failures)
    }

    /// Decode a single signal from frame data
    pub fn decode_signal(data: &[u8], signal: &SignalSpec) -> crate::Result<DecodedSignal> {
        let raw = signal.decode_raw(data)?;
        let value = signal.decode(data)?;

        Ok(DecodedSignal {
            name: signal.name().to_string(),
            value,
            raw,
            unit: signal.unit().to_string(),
            min: signal.min(),
            max: signal.max(),
        })
    }

    /// Raw value of the multiplexor switch, if the message has one and it decodes
    fn multiplexer_value(data: &[u8], message_def: &MessageDefinition) -> Option<i128> {
        let name = message_def.multiplexer_signal()?;
        let switch = message_def.signal(name)?;
        switch.decode_raw(data).ok()
    }

    fn is_active(signal: &SignalSpec, switch_value: Option<i128>) -> bool {
        match signal.multiplex() {
            Some(Multiplex::Multiplexed(value))
            | Some(Multiplex::MultiplexorAndMultiplexed(value)) => {
                switch_value == Some(i128::from(value))
            }
            Some(Multiplex::Multiplexor) | None => true,
        }
    }
}
