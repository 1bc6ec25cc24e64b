use super::*;
use crate::{Error, codec::to_bytes};

fn encode_with<M: Marker, T: TagCodec<M>>(value: &T) -> Vec<u8> {
    let mut bytes = Vec::new();
    <T as TagCodec<M>>::encode_tagged(value, &mut bytes).unwrap();
    bytes
}

fn decode_with<M: Marker, T: TagCodec<M>>(bytes: &[u8]) -> Result<T> {
    let mut reader = bytes;
    let value = <T as TagCodec<M>>::decode_tagged(&mut reader)?;
    assert!(reader.is_empty(), "{} bytes left unread", reader.len());
    Ok(value)
}

fn log_with<M: Marker, T: TagCodec<M>>(value: &T) -> String {
    let mut sink = LogSink::new();
    <T as TagCodec<M>>::log_tagged(value, &mut sink);
    sink.into_string()
}

// =============================================================================
// Plain
// =============================================================================

#[test]
fn plain_matches_default_codec() {
    let value = vec![1u32, 2, 3];

    assert_eq!(encode_with::<Plain, _>(&value), to_bytes(&value).unwrap());
    assert_eq!(decode_with::<Plain, Vec<u32>>(&to_bytes(&value).unwrap()).unwrap(), value);
}

// =============================================================================
// LengthPrefixed
// =============================================================================

#[test]
fn length_prefixed_vec_uses_u16_count() {
    let bytes = encode_with::<LengthPrefixed, _>(&vec![1u32, 2, 3]);

    assert_eq!(bytes, vec![0, 3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3]);
    assert_eq!(
        decode_with::<LengthPrefixed, Vec<u32>>(&bytes).unwrap(),
        vec![1, 2, 3]
    );
}

#[test]
fn length_prefixed_diverges_from_default() {
    let value = vec![1u32, 2, 3];

    assert_ne!(
        encode_with::<LengthPrefixed, _>(&value),
        to_bytes(&value).unwrap()
    );
}

#[test]
fn length_prefixed_boundaries() {
    let empty: Vec<u8> = Vec::new();
    assert_eq!(encode_with::<LengthPrefixed, _>(&empty), vec![0, 0]);
    assert_eq!(decode_with::<LengthPrefixed, Vec<u8>>(&[0, 0]).unwrap(), empty);

    let full = vec![0xABu8; usize::from(u16::MAX)];
    let bytes = encode_with::<LengthPrefixed, _>(&full);
    assert_eq!(decode_with::<LengthPrefixed, Vec<u8>>(&bytes).unwrap(), full);
}

#[test]
fn length_prefixed_overflow() {
    let too_long = vec![0u8; usize::from(u16::MAX) + 1];
    let mut bytes = Vec::new();

    let err = <Vec<u8> as TagCodec<LengthPrefixed>>::encode_tagged(
        &too_long, &mut bytes,
    )
    .unwrap_err();

    assert!(matches!(err, Error::LengthOverflow { len: 65536, max: 65535 }));
}

#[test]
fn length_prefixed_array_checks_count() {
    let bytes = encode_with::<LengthPrefixed, _>(&[7u8, 8]);
    assert_eq!(bytes, vec![0, 2, 7, 8]);
    assert_eq!(decode_with::<LengthPrefixed, [u8; 2]>(&bytes).unwrap(), [7, 8]);

    let mut reader = &[0u8, 3, 7, 8, 9][..];
    let err =
        <[u8; 2] as TagCodec<LengthPrefixed>>::decode_tagged(&mut reader)
            .unwrap_err();
    assert!(matches!(err, Error::LengthMismatch { expected: 2, found: 3 }));
}

#[test]
fn length_prefixed_string() {
    let bytes = encode_with::<LengthPrefixed, _>(&"park".to_string());

    assert_eq!(bytes, vec![0, 4, b'p', b'a', b'r', b'k']);
    assert_eq!(decode_with::<LengthPrefixed, String>(&bytes).unwrap(), "park");
}

// =============================================================================
// Compact
// =============================================================================

#[test]
fn compact_unsigned_roundtrip() {
    for value in [0u32, 1, 127, 128, 255, 256, 16383, 16384, u32::MAX / 2, u32::MAX] {
        let bytes = encode_with::<Compact, _>(&value);
        assert_eq!(decode_with::<Compact, u32>(&bytes).unwrap(), value);
    }
    for value in [0u128, u128::MAX] {
        let bytes = encode_with::<Compact, _>(&value);
        assert_eq!(decode_with::<Compact, u128>(&bytes).unwrap(), value);
    }
    let bytes = encode_with::<Compact, _>(&usize::MAX);
    assert_eq!(decode_with::<Compact, usize>(&bytes).unwrap(), usize::MAX);
}

#[test]
fn compact_signed_roundtrip() {
    for value in [0i32, 1, -1, 63, -64, 64, -65, i32::MAX, i32::MIN] {
        let bytes = encode_with::<Compact, _>(&value);
        assert_eq!(decode_with::<Compact, i32>(&bytes).unwrap(), value);
    }
    for value in [i16::MIN, i16::MAX] {
        let bytes = encode_with::<Compact, _>(&value);
        assert_eq!(decode_with::<Compact, i16>(&bytes).unwrap(), value);
    }
    for value in [i128::MIN, i128::MAX] {
        let bytes = encode_with::<Compact, _>(&value);
        assert_eq!(decode_with::<Compact, i128>(&bytes).unwrap(), value);
    }
}

#[test]
fn compact_is_compact() {
    assert_eq!(encode_with::<Compact, _>(&0u64), vec![0]);
    assert_eq!(encode_with::<Compact, _>(&127u64), vec![0x7F]);
    assert_eq!(encode_with::<Compact, _>(&128u64), vec![0x80, 0x01]);
    assert_eq!(encode_with::<Compact, _>(&-1i64), vec![0x01]);
    assert_eq!(encode_with::<Compact, _>(&1i64), vec![0x02]);
}

#[test]
fn compact_vec_diverges_from_default() {
    let value = vec![1u32, 2, 3];
    let bytes = encode_with::<Compact, _>(&value);

    assert_eq!(bytes, vec![3, 1, 2, 3]);
    assert_ne!(bytes, to_bytes(&value).unwrap());
    assert_eq!(decode_with::<Compact, Vec<u32>>(&bytes).unwrap(), value);
}

#[test]
fn compact_option_and_string() {
    let bytes = encode_with::<Compact, _>(&Some(300u16));
    assert_eq!(bytes, vec![1, 0xAC, 0x02]);
    assert_eq!(decode_with::<Compact, Option<u16>>(&bytes).unwrap(), Some(300));

    let bytes = encode_with::<Compact, _>(&"hi".to_string());
    assert_eq!(bytes, vec![2, b'h', b'i']);
}

#[test]
fn compact_rejects_out_of_range() {
    // 2^16 does not fit in a u16.
    let err = decode_with::<Compact, u16>(&[0x80, 0x80, 0x04]).unwrap_err();
    assert!(err.to_string().contains("out of range for u16"));
}

#[test]
fn compact_rejects_overlong_varint() {
    let err = decode_with::<Compact, u16>(&[0x80, 0x80, 0x80, 0x00]).unwrap_err();
    assert!(err.to_string().contains("varint too long"));

    let mut overflow = vec![0xFF; 18];
    overflow.push(0x7F);
    let err = decode_with::<Compact, u128>(&overflow).unwrap_err();
    assert!(err.to_string().contains("overflows"));
}

#[test]
fn compact_rejects_non_canonical_varint() {
    let err = decode_with::<Compact, u32>(&[0x81, 0x00]).unwrap_err();
    assert!(err.to_string().contains("non-canonical"));

    let err = decode_with::<Compact, Vec<u8>>(&[0x80, 0x00]).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));

    // A lone zero byte is the canonical encoding of zero.
    assert_eq!(decode_with::<Compact, u32>(&[0x00]).unwrap(), 0);
}

#[test]
fn compact_truncated_varint() {
    let err = decode_with::<Compact, u32>(&[0x80]).unwrap_err();
    assert!(err.is_truncation());
}

// =============================================================================
// BitPacked
// =============================================================================

#[test]
fn bit_packed_array_layout() {
    let flags = [true, false, true, true, false, false, false, false, true];
    let bytes = encode_with::<BitPacked, _>(&flags);

    assert_eq!(bytes, vec![0b0000_1101, 0b0000_0001]);
    assert_eq!(decode_with::<BitPacked, [bool; 9]>(&bytes).unwrap(), flags);
    assert_eq!(to_bytes(&flags).unwrap().len(), 9);
}

#[test]
fn bit_packed_vec_roundtrip() {
    for flags in [vec![], vec![true], vec![false; 8], vec![true; 17]] {
        let bytes = encode_with::<BitPacked, _>(&flags);
        assert_eq!(decode_with::<BitPacked, Vec<bool>>(&bytes).unwrap(), flags);
    }
}

#[test]
fn bit_packed_rejects_padding() {
    let err = decode_with::<BitPacked, [bool; 3]>(&[0b1000_0000]).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn bit_packed_log() {
    assert_eq!(log_with::<BitPacked, _>(&[true, false, true]), "0b101");
}

// =============================================================================
// Tag
// =============================================================================

#[test]
fn tag_encode_and_decode_into() {
    let mut source = vec![10u16, 20];
    let mut bytes = Vec::new();
    tag::<Compact, _>(&mut source).encode(&mut bytes).unwrap();

    let mut target: Vec<u16> = Vec::new();
    tag::<Compact, _>(&mut target).decode_into(&mut &bytes[..]).unwrap();

    assert_eq!(target, source);
}

#[test]
fn failed_decode_leaves_destination_untouched() {
    let mut target = vec![1u8, 2];
    let err = tag::<LengthPrefixed, _>(&mut target)
        .decode_into(&mut &[0u8, 5, 1][..])
        .unwrap_err();

    assert!(err.is_truncation());
    assert_eq!(target, vec![1, 2]);
}

#[test]
fn labelled_tag_log() {
    let mut speed = 42u8;
    let mut sink = LogSink::new();

    tag::<Plain, _>(&mut speed).labelled("speed").log(&mut sink);
    Tag::<_, Compact>::new(&mut speed).log(&mut sink);

    assert_eq!(sink.as_str(), "speed = 42; 42");
}

#[test]
fn tag_debug_shows_marker() {
    let mut value = 1u8;
    let tag = tag::<BitPacked, _>(&mut value).labelled("flags");

    assert_eq!(
        format!("{tag:?}"),
        "Tag { marker: \"bit-packed\", label: Some(\"flags\"), value: 1 }"
    );
}
