//! Signal layout and value decoding
//!
//! A [`SignalSpec`] describes one named bit-field of a frame: where its bits
//! live (in either DBC addressing convention), how they are interpreted and
//! how the integer is scaled to a physical value. Specs are immutable once
//! built; a changed definition is a new spec.

use crate::signals::bits::{self, big_endian_bit_index};
use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Receiver placeholder used when a definition names no receiving node
pub const DEFAULT_RECEIVER: &str = "XXX";

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Little-endian (Intel format), `@1` in DBC text
    #[default]
    LittleEndian,
    /// Big-endian (Motorola format), `@0` in DBC text
    BigEndian,
}

impl ByteOrder {
    /// Byte order digit used in `SG_` records
    pub fn dbc_flag(self) -> char {
        match self {
            ByteOrder::LittleEndian => '1',
            ByteOrder::BigEndian => '0',
        }
    }
}

/// Multiplexing role of a signal within its frame
///
/// Only the tag is carried here; choosing which multiplexed signals are live
/// for a given payload is up to the frame-level decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplex {
    /// The multiplexer switch itself (`M`)
    Multiplexor,
    /// Valid only when the switch equals the value (`m<n>`)
    Multiplexed(u64),
    /// Multiplexed by one switch while switching others (`m<n>M`)
    MultiplexorAndMultiplexed(u64),
}

impl fmt::Display for Multiplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplex::Multiplexor => write!(f, "M"),
            Multiplex::Multiplexed(value) => write!(f, "m{}", value),
            Multiplex::MultiplexorAndMultiplexed(value) => write!(f, "m{}M", value),
        }
    }
}

/// Position of one frame bit within a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitDescription {
    /// Zero-based offset from the signal's least significant bit
    pub bit_number: u32,
    /// True for the signal's least significant bit
    pub is_lsb: bool,
    /// True for the signal's most significant bit
    pub is_msb: bool,
    /// Occupied MSB-first linear range, reported for big-endian signals only
    pub range: Option<(u32, u32)>,
}

/// Construction parameters for a [`SignalSpec`]
///
/// Every field except `name` and `size` has a default, so a JSON record or a
/// UI form only needs to carry what differs. `min`/`max` left as `None` are
/// derived from width, signedness and scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub name: String,

    #[serde(default)]
    pub start_bit: u32,

    #[serde(default)]
    pub size: u32,

    #[serde(default)]
    pub byte_order: ByteOrder,

    #[serde(default = "default_true")]
    pub is_signed: bool,

    #[serde(default)]
    pub is_float: bool,

    #[serde(default = "default_factor")]
    pub factor: f64,

    #[serde(default)]
    pub offset: f64,

    #[serde(default)]
    pub unit: String,

    #[serde(default = "default_receiver")]
    pub receiver: Vec<String>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub multiplex: Option<Multiplex>,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,
}

fn default_true() -> bool {
    true
}

fn default_factor() -> f64 {
    1.0
}

fn default_receiver() -> Vec<String> {
    vec![DEFAULT_RECEIVER.to_string()]
}

impl SignalConfig {
    /// Start a configuration with all defaults applied
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_bit: 0,
            size: 0,
            byte_order: ByteOrder::default(),
            is_signed: true,
            is_float: false,
            factor: 1.0,
            offset: 0.0,
            unit: String::new(),
            receiver: default_receiver(),
            comment: None,
            multiplex: None,
            min: None,
            max: None,
        }
    }

    /// Builder method: set start bit and width
    pub fn with_layout(mut self, start_bit: u32, size: u32) -> Self {
        self.start_bit = start_bit;
        self.size = size;
        self
    }

    /// Builder method: set byte order
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Builder method: set signedness
    pub fn with_signed(mut self, is_signed: bool) -> Self {
        self.is_signed = is_signed;
        self
    }

    /// Builder method: mark as IEEE-754 float
    pub fn with_float(mut self, is_float: bool) -> Self {
        self.is_float = is_float;
        self
    }

    /// Builder method: set linear scaling
    pub fn with_scaling(mut self, factor: f64, offset: f64) -> Self {
        self.factor = factor;
        self.offset = offset;
        self
    }

    /// Builder method: set engineering unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Builder method: replace the receiver list
    pub fn with_receivers<I, S>(mut self, receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.receiver = receivers.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: attach a comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builder method: set multiplexing role
    pub fn with_multiplex(mut self, multiplex: Multiplex) -> Self {
        self.multiplex = Some(multiplex);
        self
    }

    /// Builder method: supply explicit physical bounds
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Validate and build the signal
    pub fn build(self) -> Result<SignalSpec> {
        SignalSpec::new(self)
    }
}

/// One named bit-field of a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SignalConfig")]
pub struct SignalSpec {
    name: String,
    start_bit: u32,
    size: u32,
    byte_order: ByteOrder,
    is_signed: bool,
    is_float: bool,
    factor: f64,
    offset: f64,
    unit: String,
    receiver: Vec<String>,
    comment: Option<String>,
    multiplex: Option<Multiplex>,
    min: f64,
    max: f64,
}

impl TryFrom<SignalConfig> for SignalSpec {
    type Error = DecoderError;

    fn try_from(config: SignalConfig) -> Result<Self> {
        Self::new(config)
    }
}

impl SignalSpec {
    /// Build a signal from its configuration
    ///
    /// Bounds missing from the configuration are derived; supplied bounds are
    /// kept as given, even when they disagree with width and scaling.
    ///
    /// # Errors
    /// * `InvalidWidth` if `size` is outside 1..=64
    pub fn new(config: SignalConfig) -> Result<Self> {
        if config.size == 0 || config.size > bits::MAX_WIDTH {
            return Err(DecoderError::InvalidWidth(config.size));
        }

        // The last occupied bit must stay addressable as a u32
        let first = match config.byte_order {
            ByteOrder::LittleEndian => config.start_bit,
            ByteOrder::BigEndian => big_endian_bit_index(config.start_bit),
        };
        if first.checked_add(config.size - 1).is_none() {
            return Err(DecoderError::OutOfRange {
                offset: i64::from(config.start_bit),
                width: config.size,
                capacity: u32::MAX as usize,
            });
        }

        let receiver = if config.receiver.is_empty() {
            default_receiver()
        } else {
            config.receiver
        };

        let mut spec = Self {
            name: config.name,
            start_bit: config.start_bit,
            size: config.size,
            byte_order: config.byte_order,
            is_signed: config.is_signed,
            is_float: config.is_float,
            factor: config.factor,
            offset: config.offset,
            unit: config.unit,
            receiver,
            comment: config.comment,
            multiplex: config.multiplex,
            min: 0.0,
            max: 0.0,
        };
        spec.min = config.min.unwrap_or_else(|| spec.calculate_min());
        spec.max = config.max.unwrap_or_else(|| spec.calculate_max());

        Ok(spec)
    }

    /// Start a builder-style configuration for a signal
    pub fn builder(name: impl Into<String>) -> SignalConfig {
        SignalConfig::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_bit(&self) -> u32 {
        self.start_bit
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn is_little_endian(&self) -> bool {
        self.byte_order == ByteOrder::LittleEndian
    }

    pub fn is_signed(&self) -> bool {
        self.is_signed
    }

    pub fn is_float(&self) -> bool {
        self.is_float
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn receiver(&self) -> &[String] {
        &self.receiver
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn multiplex(&self) -> Option<Multiplex> {
        self.multiplex
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Representable raw integer range for the signal's width and signedness
    pub fn raw_range(&self) -> (f64, f64) {
        let span = 2f64.powi(self.size as i32);
        if self.is_signed {
            let half = span / 2.0;
            (-half, half - 1.0)
        } else {
            (0.0, span - 1.0)
        }
    }

    /// Physical value of the lowest raw value
    pub fn calculate_min(&self) -> f64 {
        self.offset + self.raw_range().0 * self.factor
    }

    /// Physical value of the highest raw value
    pub fn calculate_max(&self) -> f64 {
        self.offset + self.raw_range().1 * self.factor
    }

    /// Describe a frame bit relative to this signal
    ///
    /// `bit_index` uses the same convention as the signal's own start bit:
    /// LSB-first for little-endian signals, DBC sawtooth numbering for
    /// big-endian ones. Returns `None` for bits the signal does not occupy.
    pub fn bit_description(&self, bit_index: u32) -> Option<BitDescription> {
        match self.byte_order {
            ByteOrder::LittleEndian => self.little_endian_bit_description(bit_index),
            ByteOrder::BigEndian => self.big_endian_bit_description(bit_index),
        }
    }

    fn little_endian_bit_description(&self, bit_index: u32) -> Option<BitDescription> {
        let lsb = self.start_bit;
        let msb = self.start_bit + self.size - 1;
        if bit_index < lsb || bit_index > msb {
            return None;
        }

        Some(BitDescription {
            bit_number: bit_index - lsb,
            is_lsb: bit_index == lsb,
            is_msb: bit_index == msb,
            range: None,
        })
    }

    fn big_endian_bit_description(&self, bit_index: u32) -> Option<BitDescription> {
        let (first, last) = self.big_endian_linear_range();
        let linear = big_endian_bit_index(bit_index);
        if linear < first || linear > last {
            return None;
        }

        Some(BitDescription {
            bit_number: last - linear,
            is_lsb: linear == last,
            is_msb: bit_index == self.start_bit,
            range: Some((first, last)),
        })
    }

    /// First and last MSB-first linear bit of a big-endian signal
    fn big_endian_linear_range(&self) -> (u32, u32) {
        let first = big_endian_bit_index(self.start_bit);
        (first, first + self.size - 1)
    }

    /// Extract the raw, unscaled bit pattern
    fn extract_bits(&self, data: &[u8]) -> Result<u64> {
        match self.byte_order {
            ByteOrder::LittleEndian => {
                bits::extract_lsb_first(data, self.start_bit as usize, self.size)
            }
            ByteOrder::BigEndian => {
                let (first, _) = self.big_endian_linear_range();
                bits::extract(data, first as usize, self.size)
            }
        }
    }

    /// Decode the integer value, sign-extended for signed signals
    ///
    /// Float signals return their raw bit pattern.
    pub fn decode_raw(&self, data: &[u8]) -> Result<i128> {
        let raw = self.extract_bits(data)?;
        let value = i128::from(raw);

        if self.is_signed && !self.is_float && raw & (1u64 << (self.size - 1)) != 0 {
            Ok(value - (1i128 << self.size))
        } else {
            Ok(value)
        }
    }

    /// Decode the physical value (raw * factor + offset)
    ///
    /// # Errors
    /// * `OutOfRange` if the signal does not fit in `data`
    /// * `InvalidWidth` for float signals that are not 32 or 64 bits wide
    pub fn decode(&self, data: &[u8]) -> Result<f64> {
        let raw = if self.is_float {
            let pattern = self.extract_bits(data)?;
            match self.size {
                32 => f64::from(f32::from_bits(pattern as u32)),
                64 => f64::from_bits(pattern),
                other => return Err(DecoderError::InvalidWidth(other)),
            }
        } else {
            self.decode_raw(data)? as f64
        };

        Ok(raw * self.factor + self.offset)
    }

    /// Render the `SG_` record for this signal
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SignalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SG_ {}", self.name)?;
        if let Some(multiplex) = self.multiplex {
            write!(f, " {}", multiplex)?;
        }
        write!(
            f,
            " : {}|{}@{}{} ({},{}) [{}|{}] \"{}\" {}",
            self.start_bit,
            self.size,
            self.byte_order.dbc_flag(),
            if self.is_signed { '-' } else { '+' },
            self.factor,
            self.offset,
            self.min,
            self.max,
            self.unit,
            self.receiver.join(",")
        )
    }
}

/// Equality over every attribute except the bounds, which are derivable.
/// NaN scaling compares equal to NaN so the relation stays reflexive.
impl PartialEq for SignalSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.start_bit == other.start_bit
            && self.size == other.size
            && self.byte_order == other.byte_order
            && self.is_signed == other.is_signed
            && self.is_float == other.is_float
            && same_scale(self.factor, other.factor)
            && same_scale(self.offset, other.offset)
            && self.unit == other.unit
            && self.receiver == other.receiver
            && self.comment == other.comment
            && self.multiplex == other.multiplex
    }
}

impl Eq for SignalSpec {}

fn same_scale(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned_le(start_bit: u32, size: u32) -> SignalSpec {
        SignalSpec::builder("Sig")
            .with_layout(start_bit, size)
            .with_signed(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let spec = SignalSpec::builder("Speed").with_layout(0, 8).build().unwrap();
        assert!(spec.is_little_endian());
        assert!(spec.is_signed());
        assert!(!spec.is_float());
        assert_eq!(spec.factor(), 1.0);
        assert_eq!(spec.offset(), 0.0);
        assert_eq!(spec.unit(), "");
        assert_eq!(spec.receiver(), ["XXX".to_string()]);
        assert_eq!(spec.comment(), None);
        assert_eq!(spec.multiplex(), None);
        assert_eq!(spec.min(), -128.0);
        assert_eq!(spec.max(), 127.0);
    }

    #[test]
    fn test_invalid_width_rejected() {
        assert!(matches!(
            SignalSpec::builder("Zero").build(),
            Err(DecoderError::InvalidWidth(0))
        ));
        assert!(matches!(
            SignalSpec::builder("Wide").with_layout(0, 65).build(),
            Err(DecoderError::InvalidWidth(65))
        ));
    }

    #[test]
    fn test_unaddressable_layout_rejected() {
        for byte_order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            let result = SignalSpec::builder("Far")
                .with_layout(u32::MAX - 2, 8)
                .with_byte_order(byte_order)
                .build();
            assert!(matches!(result, Err(DecoderError::OutOfRange { width: 8, .. })));
        }

        let edge = SignalSpec::builder("Edge")
            .with_layout(u32::MAX - 7, 8)
            .with_signed(false)
            .build()
            .unwrap();
        let desc = edge.bit_description(u32::MAX).unwrap();
        assert!(desc.is_msb);
        assert_eq!(desc.bit_number, 7);
        assert!(edge.bit_description(0).is_none());
        assert!(matches!(edge.decode(&[0; 8]), Err(DecoderError::OutOfRange { .. })));
    }

    #[test]
    fn test_empty_receiver_list_gets_placeholder() {
        let spec = SignalSpec::builder("Sig")
            .with_layout(0, 4)
            .with_receivers(Vec::<String>::new())
            .build()
            .unwrap();
        assert_eq!(spec.receiver(), ["XXX".to_string()]);
    }

    #[test]
    fn test_raw_range() {
        assert_eq!(unsigned_le(0, 8).raw_range(), (0.0, 255.0));
        let signed = SignalSpec::builder("S").with_layout(0, 12).build().unwrap();
        assert_eq!(signed.raw_range(), (-2048.0, 2047.0));
        assert_eq!(unsigned_le(0, 1).raw_range(), (0.0, 1.0));
    }

    #[test]
    fn test_derived_bounds_with_scaling() {
        let spec = SignalSpec::builder("Temp")
            .with_layout(16, 8)
            .with_signed(false)
            .with_scaling(1.0, -40.0)
            .build()
            .unwrap();
        assert_eq!(spec.min(), -40.0);
        assert_eq!(spec.max(), 215.0);
    }

    #[test]
    fn test_negative_factor_inverts_bounds() {
        let spec = SignalSpec::builder("Inv")
            .with_layout(0, 8)
            .with_signed(false)
            .with_scaling(-1.0, 0.0)
            .build()
            .unwrap();
        assert_eq!(spec.min(), 0.0);
        assert_eq!(spec.max(), -255.0);
    }

    #[test]
    fn test_supplied_bounds_kept_verbatim() {
        let spec = SignalSpec::builder("Speed")
            .with_layout(0, 16)
            .with_signed(false)
            .with_bounds(0.0, 8000.0)
            .build()
            .unwrap();
        assert_eq!(spec.min(), 0.0);
        assert_eq!(spec.max(), 8000.0);
    }

    #[test]
    fn test_decode_little_endian_unsigned() {
        let spec = unsigned_le(0, 8);
        let data = [0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(spec.decode_raw(&data).unwrap(), 255);
        assert_eq!(spec.decode(&data).unwrap(), 255.0);
    }

    #[test]
    fn test_decode_little_endian_cross_byte() {
        let spec = unsigned_le(4, 12);
        // LSB-first bits 4..16: high nibble of byte 0, all of byte 1
        let data = [0xA0, 0xBC];
        assert_eq!(spec.decode_raw(&data).unwrap(), 0xBCA);
    }

    #[test]
    fn test_decode_big_endian_signed() {
        let spec = SignalSpec::builder("Sig")
            .with_layout(7, 8)
            .with_byte_order(ByteOrder::BigEndian)
            .build()
            .unwrap();
        let data = [0x80, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(spec.decode_raw(&data).unwrap(), -128);
        assert_eq!(spec.decode(&data).unwrap(), -128.0);
    }

    #[test]
    fn test_decode_big_endian_cross_byte() {
        // MSB at bit 3 of byte 0, 12 bits: low nibble of byte 0 + byte 1
        let spec = SignalSpec::builder("Sig")
            .with_layout(3, 12)
            .with_byte_order(ByteOrder::BigEndian)
            .with_signed(false)
            .build()
            .unwrap();
        let data = [0xAB, 0xCD];
        assert_eq!(spec.decode_raw(&data).unwrap(), 0xBCD);
    }

    #[test]
    fn test_decode_scaling() {
        let spec = SignalSpec::builder("Voltage")
            .with_layout(0, 16)
            .with_signed(false)
            .with_scaling(0.01, 0.0)
            .build()
            .unwrap();
        let data = [0xE8, 0x03];
        let value = spec.decode(&data).unwrap();
        assert!((value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_decode_one_bit() {
        let unsigned = unsigned_le(3, 1);
        let signed = SignalSpec::builder("S").with_layout(3, 1).build().unwrap();
        assert_eq!(unsigned.decode(&[0x08]).unwrap(), 1.0);
        assert_eq!(unsigned.decode(&[0x00]).unwrap(), 0.0);
        assert_eq!(signed.decode(&[0x08]).unwrap(), -1.0);
        assert_eq!(signed.decode(&[0xF7]).unwrap(), 0.0);
    }

    #[test]
    fn test_decode_64_bit_signed() {
        let spec = SignalSpec::builder("Counter").with_layout(0, 64).build().unwrap();
        assert_eq!(spec.decode_raw(&[0xFF; 8]).unwrap(), -1);

        let unsigned = unsigned_le(0, 64);
        assert_eq!(unsigned.decode_raw(&[0xFF; 8]).unwrap(), i128::from(u64::MAX));
    }

    #[test]
    fn test_decode_float32() {
        let spec = SignalSpec::builder("Pressure")
            .with_layout(0, 32)
            .with_float(true)
            .build()
            .unwrap();
        let data = 1.5f32.to_le_bytes();
        assert_eq!(spec.decode(&data).unwrap(), 1.5);
    }

    #[test]
    fn test_decode_float64_big_endian_scaled() {
        let spec = SignalSpec::builder("Position")
            .with_layout(7, 64)
            .with_byte_order(ByteOrder::BigEndian)
            .with_float(true)
            .with_scaling(2.0, 1.0)
            .build()
            .unwrap();
        let data = (-3.25f64).to_be_bytes();
        assert_eq!(spec.decode(&data).unwrap(), -5.5);
    }

    #[test]
    fn test_float_requires_ieee_width() {
        let spec = SignalSpec::builder("Odd")
            .with_layout(0, 16)
            .with_float(true)
            .build()
            .unwrap();
        assert!(matches!(spec.decode(&[0, 0]), Err(DecoderError::InvalidWidth(16))));
    }

    #[test]
    fn test_decode_out_of_range_both_orders() {
        let le = unsigned_le(60, 8);
        assert!(matches!(le.decode(&[0; 8]), Err(DecoderError::OutOfRange { .. })));

        let be = SignalSpec::builder("Sig")
            .with_layout(63, 16)
            .with_byte_order(ByteOrder::BigEndian)
            .build()
            .unwrap();
        assert!(matches!(be.decode(&[0; 8]), Err(DecoderError::OutOfRange { .. })));
    }

    #[test]
    fn test_little_endian_bit_description() {
        let spec = unsigned_le(4, 8);
        assert_eq!(spec.bit_description(3), None);
        assert_eq!(spec.bit_description(12), None);

        let lsb = spec.bit_description(4).unwrap();
        assert_eq!(lsb.bit_number, 0);
        assert!(lsb.is_lsb && !lsb.is_msb);
        assert_eq!(lsb.range, None);

        let msb = spec.bit_description(11).unwrap();
        assert_eq!(msb.bit_number, 7);
        assert!(msb.is_msb && !msb.is_lsb);
    }

    #[test]
    fn test_big_endian_bit_description() {
        // MSB at DBC bit 7 (byte 0), 12 bits: ends at DBC bit 12 (byte 1, bit 4)
        let spec = SignalSpec::builder("Sig")
            .with_layout(7, 12)
            .with_byte_order(ByteOrder::BigEndian)
            .build()
            .unwrap();

        let msb = spec.bit_description(7).unwrap();
        assert!(msb.is_msb && !msb.is_lsb);
        assert_eq!(msb.bit_number, 11);
        assert_eq!(msb.range, Some((0, 11)));

        let lsb = spec.bit_description(12).unwrap();
        assert!(lsb.is_lsb && !lsb.is_msb);
        assert_eq!(lsb.bit_number, 0);

        assert_eq!(spec.bit_description(11), None);
        assert_eq!(spec.bit_description(23), None);
        assert!(spec.bit_description(0).is_some());
    }

    #[test]
    fn test_text_rendering() {
        let spec = SignalSpec::builder("EngineTemp")
            .with_layout(16, 8)
            .with_signed(false)
            .with_scaling(1.0, -40.0)
            .with_unit("C")
            .with_receivers(["ECU2"])
            .build()
            .unwrap();
        assert_eq!(
            spec.text(),
            "SG_ EngineTemp : 16|8@1+ (1,-40) [-40|215] \"C\" ECU2"
        );
    }

    #[test]
    fn test_text_rendering_multiplexed_big_endian() {
        let spec = SignalSpec::builder("SignalB")
            .with_layout(15, 16)
            .with_byte_order(ByteOrder::BigEndian)
            .with_scaling(0.1, 0.0)
            .with_bounds(0.0, 1000.0)
            .with_unit("mV")
            .with_receivers(["ECU1", "ECU2"])
            .with_multiplex(Multiplex::Multiplexed(1))
            .build()
            .unwrap();
        assert_eq!(
            spec.text(),
            "SG_ SignalB m1 : 15|16@0- (0.1,0) [0|1000] \"mV\" ECU1,ECU2"
        );
    }

    #[test]
    fn test_multiplex_display() {
        assert_eq!(Multiplex::Multiplexor.to_string(), "M");
        assert_eq!(Multiplex::Multiplexed(3).to_string(), "m3");
        assert_eq!(Multiplex::MultiplexorAndMultiplexed(2).to_string(), "m2M");
    }

    #[test]
    fn test_equality_ignores_bounds() {
        let base = SignalSpec::builder("Sig").with_layout(0, 8);
        let derived = base.clone().build().unwrap();
        let bounded = base.with_bounds(-1.0, 1.0).build().unwrap();
        assert_eq!(derived, bounded);
    }

    #[test]
    fn test_equality_each_attribute() {
        let base = SignalSpec::builder("Sig")
            .with_layout(0, 8)
            .with_receivers(["A", "B"]);
        let reference = base.clone().build().unwrap();
        assert_eq!(reference, reference.clone());

        let variants = vec![
            SignalConfig { name: "Other".to_string(), ..base.clone() },
            base.clone().with_layout(1, 8),
            base.clone().with_layout(0, 9),
            base.clone().with_byte_order(ByteOrder::BigEndian),
            base.clone().with_signed(false),
            base.clone().with_float(true),
            base.clone().with_scaling(2.0, 0.0),
            base.clone().with_scaling(1.0, 1.0),
            base.clone().with_unit("V"),
            base.clone().with_receivers(["B", "A"]),
            base.clone().with_receivers(["A"]),
            base.clone().with_comment("note"),
            base.clone().with_multiplex(Multiplex::Multiplexed(0)),
        ];
        for variant in variants {
            let other = variant.build().unwrap();
            assert_ne!(reference, other, "{} should differ", other.text());
        }
    }

    #[test]
    fn test_nan_factor_is_reflexive() {
        let spec = SignalSpec::builder("Sig")
            .with_layout(0, 8)
            .with_scaling(f64::NAN, 0.0)
            .build()
            .unwrap();
        assert_eq!(spec, spec.clone());
    }

    #[test]
    fn test_signed_zero_offset_is_equal() {
        let base = SignalSpec::builder("Sig").with_layout(0, 8);
        let positive = base.clone().with_scaling(1.0, 0.0).build().unwrap();
        let negative = base.with_scaling(1.0, -0.0).build().unwrap();
        assert_eq!(positive, negative);
    }
}
