//! Signal database
//!
//! Holds message (frame) definitions loaded from one or more DBC sources and
//! answers lookups by CAN ID and by signal name.

use crate::signals::spec::{Multiplex, SignalSpec};
use crate::types::{DecoderError, Result};
use std::collections::{HashMap, HashSet};

/// A CAN message definition: one frame layout and its signal set
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefinition {
    id: u32,
    name: String,
    size: usize,
    sender: Option<String>,
    signals: Vec<SignalSpec>,
    multiplexer_signal: Option<String>,
}

impl MessageDefinition {
    /// Create a message definition
    ///
    /// # Errors
    /// * `InvalidSignalSet` if two signals share a name, or more than one
    ///   plain multiplexor switch is defined
    pub fn new(
        id: u32,
        name: impl Into<String>,
        size: usize,
        sender: Option<String>,
        signals: Vec<SignalSpec>,
    ) -> Result<Self> {
        let name = name.into();

        let mut seen = HashSet::new();
        for signal in &signals {
            if !seen.insert(signal.name()) {
                return Err(DecoderError::InvalidSignalSet(format!(
                    "duplicate signal '{}' in message '{}' (0x{:X})",
                    signal.name(),
                    name,
                    id
                )));
            }
        }

        let mut switches = signals
            .iter()
            .filter(|s| s.multiplex() == Some(Multiplex::Multiplexor))
            .map(|s| s.name().to_string());
        let multiplexer_signal = switches.next();
        if let Some(extra) = switches.next() {
            return Err(DecoderError::InvalidSignalSet(format!(
                "message '{}' (0x{:X}) has more than one multiplexor: '{}'",
                name, id, extra
            )));
        }

        Ok(Self {
            id,
            name,
            size,
            sender,
            signals,
            multiplexer_signal,
        })
    }

    /// CAN message ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Message name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sender node name (optional)
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// All signals in definition order
    pub fn signals(&self) -> &[SignalSpec] {
        &self.signals
    }

    /// Look up a signal by name
    pub fn signal(&self, name: &str) -> Option<&SignalSpec> {
        self.signals.iter().find(|s| s.name() == name)
    }

    /// Name of the multiplexor switch, if the message is multiplexed
    pub fn multiplexer_signal(&self) -> Option<&str> {
        self.multiplexer_signal.as_deref()
    }

    /// True if any signal carries a multiplex tag
    pub fn is_multiplexed(&self) -> bool {
        self.signals.iter().any(|s| s.multiplex().is_some())
    }

    /// `BO_` header line followed by one `SG_` line per signal
    pub fn text(&self) -> String {
        let mut out = format!(
            "BO_ {} {}: {} {}",
            self.id,
            self.name,
            self.size,
            self.sender.as_deref().unwrap_or(crate::signals::spec::DEFAULT_RECEIVER)
        );
        for signal in &self.signals {
            out.push_str("\n ");
            out.push_str(&signal.text());
        }
        out
    }
}

/// The unified signal database
#[derive(Debug, Default)]
pub struct SignalDatabase {
    /// All message definitions by CAN ID; the first definition loaded wins
    messages: HashMap<u32, MessageDefinition>,

    /// Signal name lookup for quick access
    /// Key: Signal name, Value: CAN IDs of the messages carrying it
    signal_lookup: HashMap<String, Vec<u32>>,
}

impl SignalDatabase {
    /// Create a new empty signal database
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message definition to the database
    ///
    /// Returns false, leaving the database unchanged, when a message with the
    /// same CAN ID is already present.
    pub fn add_message(&mut self, message: MessageDefinition) -> bool {
        let can_id = message.id;
        if let Some(existing) = self.messages.get(&can_id) {
            log::warn!(
                "Ignoring message '{}': CAN ID 0x{:X} already defined by '{}'",
                message.name,
                can_id,
                existing.name
            );
            return false;
        }

        for signal in &message.signals {
            self.signal_lookup
                .entry(signal.name().to_string())
                .or_default()
                .push(can_id);
        }

        self.messages.insert(can_id, message);
        true
    }

    /// Get the message definition for a CAN ID
    pub fn get_message(&self, can_id: u32) -> Option<&MessageDefinition> {
        self.messages.get(&can_id)
    }

    /// Get a message definition by name
    pub fn get_message_by_name(&self, message_name: &str) -> Option<&MessageDefinition> {
        self.messages.values().find(|m| m.name == message_name)
    }

    /// Find all messages containing a specific signal name
    pub fn find_signal(&self, signal_name: &str) -> Vec<(u32, &SignalSpec)> {
        let mut found: Vec<(u32, &SignalSpec)> = self
            .signal_lookup
            .get(signal_name)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| {
                        self.messages
                            .get(id)
                            .and_then(|msg| msg.signal(signal_name))
                            .map(|sig| (*id, sig))
                    })
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by_key(|(id, _)| *id);
        found
    }

    /// Iterate over all messages in CAN ID order
    pub fn messages(&self) -> impl Iterator<Item = &MessageDefinition> {
        self.get_all_can_ids()
            .into_iter()
            .filter_map(move |id| self.messages.get(&id))
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.values().map(|m| m.signals.len()).sum(),
        }
    }

    /// Get all unique CAN IDs in the database
    pub fn get_all_can_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.messages.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
}
