// Decoding properties checked through the public API
use can_signal_decoder::signals::bits;
use can_signal_decoder::signals::dbc::parse_signal_line;
use can_signal_decoder::{big_endian_bit_index, ByteOrder, DecoderError, Multiplex, SignalSpec};

fn spec(start_bit: u32, size: u32, byte_order: ByteOrder, signed: bool) -> SignalSpec {
    SignalSpec::builder("Sig")
        .with_layout(start_bit, size)
        .with_byte_order(byte_order)
        .with_signed(signed)
        .build()
        .unwrap()
}

/// Little-endian payload holding `raw` in bits [start, start + size)
fn encode_le(raw: u64, start: u32, size: u32) -> [u8; 8] {
    let mask = if size == 64 { u64::MAX } else { (1u64 << size) - 1 };
    ((raw & mask) << start).to_le_bytes()
}

#[test]
fn test_signed_range_bounds_decoded_extremes() {
    for size in 1..=32u32 {
        for &factor in &[1.0, 0.1, 3.5] {
            let sig = SignalSpec::builder("S")
                .with_layout(0, size)
                .with_scaling(factor, -7.0)
                .build()
                .unwrap();

            let raw_min = 1u64 << (size - 1);
            let raw_max = raw_min - 1;
            let lowest = sig.decode(&encode_le(raw_min, 0, size)).unwrap();
            let highest = sig.decode(&encode_le(raw_max, 0, size)).unwrap();

            assert!(sig.calculate_min() <= lowest, "size {} factor {}", size, factor);
            assert!(sig.calculate_max() >= highest, "size {} factor {}", size, factor);
            assert!(sig.min() <= sig.max());
        }
    }
}

#[test]
fn test_big_endian_bit_index_involution() {
    for n in 0..(64 * 8) {
        assert_eq!(big_endian_bit_index(big_endian_bit_index(n)), n);
    }
}

#[test]
fn test_one_bit_signals() {
    let unsigned = spec(5, 1, ByteOrder::LittleEndian, false);
    let signed = spec(5, 1, ByteOrder::LittleEndian, true);
    for byte in 0..=255u8 {
        let u = unsigned.decode(&[byte]).unwrap();
        let s = signed.decode(&[byte]).unwrap();
        assert!(u == 0.0 || u == 1.0);
        assert!(s == 0.0 || s == -1.0);
        assert_eq!(u == 1.0, s == -1.0);
    }
}

#[test]
fn test_little_endian_byte_example() {
    let sig = spec(0, 8, ByteOrder::LittleEndian, false);
    let data = [0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert_eq!(sig.decode_raw(&data).unwrap(), 255);
    assert_eq!(sig.decode(&data).unwrap(), 255.0);
}

#[test]
fn test_big_endian_signed_example() {
    let sig = spec(7, 8, ByteOrder::BigEndian, true);
    let data = [0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert_eq!(sig.decode_raw(&data).unwrap(), -128);
    assert_eq!(sig.decode(&data).unwrap(), -128.0);
}

#[test]
fn test_64_bit_big_endian_is_exact() {
    let sig = SignalSpec::builder("Wide")
        .with_layout(7, 64)
        .with_byte_order(ByteOrder::BigEndian)
        .with_signed(false)
        .with_scaling(0.01, 0.0)
        .build()
        .unwrap();
    let data = [0x01u8; 8];

    let reference = data.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
    assert_eq!(reference, 0x0101_0101_0101_0101);
    assert_eq!(sig.decode_raw(&data).unwrap(), reference as i128);
    assert_eq!(sig.decode(&data).unwrap(), reference as f64 * 0.01);
}

#[test]
fn test_64_bit_little_endian_high_bit_is_exact() {
    let sig = spec(0, 64, ByteOrder::LittleEndian, false);
    let data = 0x8000_0000_0000_0001u64.to_le_bytes();
    assert_eq!(sig.decode_raw(&data).unwrap(), 0x8000_0000_0000_0001i128);
}

#[test]
fn test_out_of_range_for_both_orders() {
    let data = [0u8; 8];

    let le = spec(57, 8, ByteOrder::LittleEndian, false);
    assert!(matches!(le.decode(&data), Err(DecoderError::OutOfRange { .. })));
    assert!(spec(56, 8, ByteOrder::LittleEndian, false).decode(&data).is_ok());

    // DBC bit 56 is the LSB of byte 7: an 8-bit field starting there spills over
    let be = spec(56, 8, ByteOrder::BigEndian, false);
    assert!(matches!(be.decode(&data), Err(DecoderError::OutOfRange { .. })));
    assert!(spec(63, 8, ByteOrder::BigEndian, false).decode(&data).is_ok());

    assert!(matches!(
        spec(0, 16, ByteOrder::LittleEndian, false).decode(&[0xFF]),
        Err(DecoderError::OutOfRange { .. })
    ));
}

#[test]
fn test_extractor_and_spec_agree_on_big_endian() {
    let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
    for start in 0..64u32 {
        for size in 1..=16u32 {
            let offset = big_endian_bit_index(start) as usize;
            let direct = bits::extract(&data, offset, size);
            let via_spec = spec(start, size, ByteOrder::BigEndian, false).decode_raw(&data);
            match (direct, via_spec) {
                (Ok(a), Ok(b)) => assert_eq!(i128::from(a), b),
                (Err(_), Err(_)) => {}
                other => panic!("start {} size {} disagree: {:?}", start, size, other),
            }
        }
    }
}

#[test]
fn test_text_round_trip_through_parser() {
    let specs = vec![
        SignalSpec::builder("VehicleSpeed")
            .with_layout(0, 16)
            .with_signed(false)
            .with_scaling(0.01, 0.0)
            .with_unit("km/h")
            .with_receivers(["Dash"])
            .build()
            .unwrap(),
        SignalSpec::builder("SteerAngle")
            .with_layout(39, 16)
            .with_byte_order(ByteOrder::BigEndian)
            .with_scaling(0.1, -10.5)
            .with_unit("deg")
            .build()
            .unwrap(),
        SignalSpec::builder("Page")
            .with_layout(56, 4)
            .with_signed(false)
            .with_multiplex(Multiplex::Multiplexed(2))
            .build()
            .unwrap(),
    ];

    for original in specs {
        let line = original.text();
        let parsed = parse_signal_line(&line).unwrap();
        assert_eq!(parsed.text(), line);
        assert_eq!(parsed, original);
    }
}

#[test]
fn test_equality_detects_multiplex_difference() {
    let plain = spec(0, 8, ByteOrder::LittleEndian, true);
    let muxed = SignalSpec::builder("Sig")
        .with_layout(0, 8)
        .with_multiplex(Multiplex::Multiplexor)
        .build()
        .unwrap();
    assert_ne!(plain, muxed);
    assert_eq!(plain, spec(0, 8, ByteOrder::LittleEndian, true));
}

#[test]
fn test_json_construction_applies_defaults() {
    let sig: SignalSpec =
        serde_json::from_str(r#"{"name": "Gear", "start_bit": 8, "size": 4}"#).unwrap();
    assert!(sig.is_little_endian());
    assert!(sig.is_signed());
    assert_eq!(sig.receiver(), ["XXX".to_string()]);
    assert_eq!((sig.min(), sig.max()), (-8.0, 7.0));

    let invalid = serde_json::from_str::<SignalSpec>(r#"{"name": "Bad", "size": 70}"#);
    assert!(invalid.is_err());
}

#[test]
fn test_json_serialization_keeps_supplied_bounds() {
    let sig = SignalSpec::builder("Rpm")
        .with_layout(0, 16)
        .with_signed(false)
        .with_bounds(0.0, 8000.0)
        .build()
        .unwrap();
    let json = serde_json::to_string(&sig).unwrap();
    let back: SignalSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sig);
    assert_eq!(back.max(), 8000.0);
}
