//! Decoded entry series
//!
//! A time-ordered series of decoded values for one message, plus the lookups
//! a viewer needs on top of it: mapping a time window to entry indices and
//! down-sampling one signal into plot points. Entries must be sorted by time.

use crate::message_decoder::MessageDecoder;
use crate::signals::database::MessageDefinition;
use crate::types::{CanFrame, DecodedEvent};
use serde::Serialize;
use std::collections::BTreeMap;

/// One decoded frame of a message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Seconds since the series origin
    pub time: f64,
    /// Physical value per successfully decoded signal
    pub signals: BTreeMap<String, f64>,
}

/// A plot sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub unit: String,
}

impl Entry {
    /// Decode a frame into an entry timed relative to `origin_ns`
    pub fn from_frame(frame: &CanFrame, message_def: &MessageDefinition, origin_ns: u64) -> Self {
        let (decoded, _) = MessageDecoder::decode_signals(&frame.data, message_def);
        Self {
            time: frame.timestamp_ns.saturating_sub(origin_ns) as f64 / 1e9,
            signals: decoded.into_iter().map(|s| (s.name, s.value)).collect(),
        }
    }

    /// Entry for an already decoded event at `time` seconds
    pub fn from_event(time: f64, event: &DecodedEvent) -> Self {
        Self {
            time,
            signals: event.signals().iter().map(|s| (s.name.clone(), s.value)).collect(),
        }
    }
}

/// Build the entry series of one message from a frame sequence
///
/// Frames with other CAN IDs are ignored. Times are relative to the first
/// frame of the sequence, whatever its ID.
pub fn build_entries<'a, I>(frames: I, message_def: &MessageDefinition) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a CanFrame>,
{
    let mut origin = None;
    frames
        .into_iter()
        .filter_map(|frame| {
            let origin_ns = *origin.get_or_insert(frame.timestamp_ns);
            (frame.can_id == message_def.id())
                .then(|| Entry::from_frame(frame, message_def, origin_ns))
        })
        .collect()
}

/// Index of the first entry at or after `time`
pub fn find_time_index(entries: &[Entry], time: f64) -> Option<usize> {
    let index = entries.partition_point(|e| e.time < time);
    (index < entries.len()).then_some(index)
}

/// Inclusive bounding indices of the entries inside `[start, end]`
///
/// Returns `None` when the window is empty or inverted, or holds no entry.
pub fn find_segment_indices(entries: &[Entry], start: f64, end: f64) -> Option<(usize, usize)> {
    if start > end {
        return None;
    }

    let low = entries.partition_point(|e| e.time < start);
    let high = entries.partition_point(|e| e.time <= end);
    (low < high).then(|| (low, high - 1))
}

/// Seconds covered by the series, or by the segment when one is given
pub fn seconds_loaded(entries: &[Entry], segment: Option<(usize, usize)>) -> f64 {
    let (low, high) = match segment {
        Some(bounds) => bounds,
        None if entries.is_empty() => return 0.0,
        None => (0, entries.len() - 1),
    };
    match (entries.get(low), entries.get(high)) {
        (Some(first), Some(last)) => last.time - first.time,
        _ => 0.0,
    }
}

/// Plot samples of one signal, keeping at most about `max_points` of them
///
/// Entries are kept at a fixed stride, so the first entry is always present.
/// Entries where the signal failed to decode are skipped.
pub fn graph_data(
    entries: &[Entry],
    signal_name: &str,
    unit: &str,
    max_points: usize,
) -> Vec<PlotPoint> {
    let stride = match max_points {
        0 => 1,
        max => (entries.len() / max).max(1),
    };

    entries
        .iter()
        .step_by(stride)
        .filter_map(|entry| {
            entry.signals.get(signal_name).map(|&y| PlotPoint {
                x: entry.time,
                y,
                unit: unit.to_string(),
            })
        })
        .collect()
}
