//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct is the entry point for loading signal definitions and
//! decoding frames or log files.

use crate::config::DecoderConfig;
use crate::formats::CandumpParser;
use crate::message_decoder::MessageDecoder;
use crate::signals::{MessageDefinition, SignalDatabase};
use crate::types::{CanFrame, DecodedEvent, DecoderError, Result};
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
///
/// Decoding borrows the decoder immutably, so one instance can serve many
/// threads at once.
#[derive(Debug, Default)]
pub struct Decoder {
    /// Internal signal database (loaded from DBC sources)
    signal_db: SignalDatabase,
}

impl Decoder {
    /// Create a new decoder instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a DBC file and add its definitions to the signal database
    ///
    /// # Example
    /// ```no_run
    /// use can_signal_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let mut decoder = Decoder::new();
    /// decoder.add_dbc(Path::new("powertrain.dbc")).unwrap();
    /// ```
    pub fn add_dbc(&mut self, path: &Path) -> Result<()> {
        log::info!("Loading DBC file: {:?}", path);

        let messages = crate::signals::dbc::parse_dbc_file(path)?;
        self.add_messages(messages);

        log::info!("DBC file loaded successfully: {:?}", path);
        Ok(())
    }

    /// Add the definitions of DBC text held in memory
    pub fn add_dbc_str(&mut self, content: &str) -> Result<()> {
        let messages = crate::signals::dbc::parse_dbc_str(content)?;
        self.add_messages(messages);
        Ok(())
    }

    /// Add a single message definition
    pub fn add_message(&mut self, message: MessageDefinition) -> bool {
        self.signal_db.add_message(message)
    }

    fn add_messages(&mut self, messages: Vec<MessageDefinition>) {
        for message in messages {
            self.signal_db.add_message(message);
        }
    }

    /// Read access to the loaded definitions
    pub fn database(&self) -> &SignalDatabase {
        &self.signal_db
    }

    /// Get statistics about the loaded signal database
    pub fn database_stats(&self) -> DatabaseStats {
        self.signal_db.stats()
    }

    /// Decode one frame
    ///
    /// Returns `None` for frames removed by the filters, and for unknown IDs
    /// unless raw frames are requested.
    pub fn decode_frame(&self, frame: &CanFrame, config: &DecoderConfig) -> Option<DecodedEvent> {
        if !config.should_process_frame(&frame.channel, frame.can_id) {
            return None;
        }

        match self.signal_db.get_message(frame.can_id) {
            Some(message_def) if config.decode_signals => {
                log::debug!("Decoding message: {} (ID 0x{:X})", message_def.name(), frame.can_id);
                Some(MessageDecoder::decode_message(frame, message_def))
            }
            Some(_) => Some(raw_event(frame)),
            None if config.emit_raw_frames => {
                log::trace!("Unknown CAN ID: 0x{:X}, emitting as raw frame", frame.can_id);
                Some(raw_event(frame))
            }
            None => None,
        }
    }

    /// Decode a sequence of frames lazily
    pub fn decode_frames<'a, I>(
        &'a self,
        frames: I,
        config: DecoderConfig,
    ) -> impl Iterator<Item = Result<DecodedEvent>> + 'a
    where
        I: IntoIterator<Item = Result<CanFrame>>,
        I::IntoIter: 'a,
    {
        DecodingIterator {
            frame_iter: frames.into_iter(),
            decoder: self,
            config,
        }
    }

    /// Decode a log file and return an iterator of decoded events
    ///
    /// # Example
    /// ```no_run
    /// use can_signal_decoder::{Decoder, DecoderConfig};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let events = decoder.decode_file(Path::new("trace.log"), DecoderConfig::new()).unwrap();
    ///
    /// for event in events {
    ///     match event {
    ///         Ok(decoded) => println!("Decoded event: {:?}", decoded),
    ///         Err(e) => eprintln!("Error: {}", e),
    ///     }
    /// }
    /// ```
    pub fn decode_file(
        &self,
        path: &Path,
        config: DecoderConfig,
    ) -> Result<Box<dyn Iterator<Item = Result<DecodedEvent>> + '_>> {
        log::info!("Decoding log file: {:?}", path);

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("log") | Some("candump") => {
                log::debug!("Detected candump log format");
                let frames = CandumpParser::parse(path)?;
                Ok(Box::new(self.decode_frames(frames, config)))
            }
            _ => Err(DecoderError::LogParseError(format!(
                "Unsupported file format: {:?}",
                extension
            ))),
        }
    }
}

fn raw_event(frame: &CanFrame) -> DecodedEvent {
    DecodedEvent::RawFrame {
        timestamp: frame.timestamp(),
        channel: frame.channel.clone(),
        can_id: frame.can_id,
        data: frame.data.clone(),
        is_fd: frame.is_fd,
    }
}

/// Iterator that decodes CAN frames into decoded events, skipping frames
/// that produce no event
struct DecodingIterator<'a, I> {
    frame_iter: I,
    decoder: &'a Decoder,
    config: DecoderConfig,
}

impl<'a, I> Iterator for DecodingIterator<'a, I>
where
    I: Iterator<Item = Result<CanFrame>>,
{
    type Item = Result<DecodedEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.frame_iter.next()? {
                Ok(frame) => {
                    if let Some(event) = self.decoder.decode_frame(&frame, &self.config) {
                        return Some(Ok(event));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

// Re-export DatabaseStats for public API
pub use crate::signals::DatabaseStats;
