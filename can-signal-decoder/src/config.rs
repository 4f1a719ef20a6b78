//! Decoder configuration types
//!
//! This module defines the minimal configuration needed by the decoder library.
//! Presentation concerns (output format, plotting, time windows) belong to the
//! application layer.

use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Whether to decode signals (false = only emit raw frames)
    #[serde(default = "default_true")]
    pub decode_signals: bool,

    /// Optional: only decode frames from these CAN interfaces
    #[serde(default)]
    pub channel_filter: Option<Vec<String>>,

    /// Optional: only decode these specific CAN message IDs
    #[serde(default)]
    pub message_filter: Option<Vec<u32>>,

    /// Whether to emit frames with unknown IDs as raw frame events
    #[serde(default)]
    pub emit_raw_frames: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            decode_signals: true,
            channel_filter: None,
            message_filter: None,
            emit_raw_frames: false,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable signal decoding
    pub fn with_signal_decoding(mut self, enabled: bool) -> Self {
        self.decode_signals = enabled;
        self
    }

    /// Builder method: set channel filter
    pub fn with_channel_filter<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channel_filter = Some(channels.into_iter().map(Into::into).collect());
        self
    }

    /// Builder method: set message filter
    pub fn with_message_filter(mut self, messages: Vec<u32>) -> Self {
        self.message_filter = Some(messages);
        self
    }

    /// Builder method: enable raw frame emission
    pub fn with_raw_frames(mut self, enabled: bool) -> Self {
        self.emit_raw_frames = enabled;
        self
    }

    /// Check if a channel should be processed
    pub fn should_process_channel(&self, channel: &str) -> bool {
        match &self.channel_filter {
            Some(channels) => channels.iter().any(|c| c == channel),
            None => true,
        }
    }

    /// Check if a message ID should be processed
    pub fn should_process_message(&self, can_id: u32) -> bool {
        match &self.message_filter {
            Some(messages) => messages.contains(&can_id),
            None => true,
        }
    }

    /// Check if a frame should be processed based on filters
    pub fn should_process_frame(&self, channel: &str, can_id: u32) -> bool {
        self.should_process_channel(channel) && self.should_process_message(can_id)
    }
}
