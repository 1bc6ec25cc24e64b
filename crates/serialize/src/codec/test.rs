use std::{
    collections::{BTreeMap, VecDeque},
    fmt::Debug,
    time::Duration,
};

use super::*;

fn roundtrip<T: Codec + PartialEq + Debug>(value: &T) {
    let bytes = to_bytes(value).unwrap();
    let mut reader = &bytes[..];
    let decoded = T::decode(&mut reader).unwrap();

    assert_eq!(&decoded, value);
    assert!(reader.is_empty(), "{} bytes left unread", reader.len());
}

#[test]
fn integer_boundaries_roundtrip() {
    for value in [0u8, 1, u8::MAX] {
        roundtrip(&value);
    }
    for value in [0u16, 1, u16::MAX] {
        roundtrip(&value);
    }
    for value in [0u32, 1, u32::MAX] {
        roundtrip(&value);
    }
    for value in [0u64, 1, u64::MAX] {
        roundtrip(&value);
    }
    for value in [0u128, u128::MAX] {
        roundtrip(&value);
    }
    for value in [i8::MIN, -1, 0, i8::MAX] {
        roundtrip(&value);
    }
    for value in [i16::MIN, -1, 0, i16::MAX] {
        roundtrip(&value);
    }
    for value in [i32::MIN, -1, 0, i32::MAX] {
        roundtrip(&value);
    }
    for value in [i64::MIN, -1, 0, i64::MAX] {
        roundtrip(&value);
    }
    for value in [i128::MIN, 0, i128::MAX] {
        roundtrip(&value);
    }
    roundtrip(&usize::MAX);
    roundtrip(&isize::MIN);
}

#[test]
fn integers_are_big_endian() {
    assert_eq!(to_bytes(&0x0102_0304u32).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(to_bytes(&-2i16).unwrap(), vec![0xFF, 0xFE]);
    assert_eq!(to_bytes(&7usize).unwrap(), vec![0, 0, 0, 0, 0, 0, 0, 7]);
}

#[test]
#[allow(clippy::float_cmp)]
fn floats_roundtrip() {
    roundtrip(&std::f32::consts::PI);
    roundtrip(&f64::MIN_POSITIVE);
    roundtrip(&-0.0f64);

    let bytes = to_bytes(&f32::NAN).unwrap();
    assert!(from_bytes::<f32>(&bytes).unwrap().is_nan());
}

#[test]
fn bool_and_char() {
    roundtrip(&true);
    roundtrip(&false);
    roundtrip(&'λ');

    let err = from_bytes::<bool>(&[2]).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));

    let err = from_bytes::<char>(&0xD800u32.to_be_bytes()).unwrap_err();
    assert!(err.to_string().contains("invalid Unicode scalar value"));
}

#[test]
fn strings_roundtrip() {
    roundtrip(&String::new());
    roundtrip(&"x".to_string());
    roundtrip(&"guest 42 joined the park".to_string());

    assert_eq!(to_bytes(&"ab".to_string()).unwrap(), vec![0, 0, 0, 2, b'a', b'b']);
}

#[test]
fn invalid_utf8_is_rejected() {
    let err = from_bytes::<String>(&[0, 0, 0, 1, 0xFF]).unwrap_err();
    assert!(err.to_string().contains("invalid UTF-8"));
}

#[test]
fn containers_roundtrip() {
    roundtrip(&Vec::<u32>::new());
    roundtrip(&vec![7u32]);
    roundtrip(&vec![1u16, 2, 3]);
    roundtrip(&VecDeque::from([1i8, -1]));
    roundtrip(&[0u8; 0]);
    roundtrip(&[1u32, 2, 3, 4]);
    roundtrip(&Some(5u8));
    roundtrip(&None::<u8>);
    roundtrip(&Box::new(9i64));
    roundtrip(&BTreeMap::from([(1u8, "one".to_string()), (2, "two".to_string())]));
    roundtrip(&(1u8, -2i32, "three".to_string()));
    roundtrip(&());
    roundtrip(&Duration::new(5, 999_999_999));
}

#[test]
fn fixed_arrays_have_no_prefix() {
    assert_eq!(to_bytes(&[1u8, 2, 3]).unwrap(), vec![1, 2, 3]);
    assert_eq!(to_bytes(&vec![1u8, 2, 3]).unwrap(), vec![0, 0, 0, 3, 1, 2, 3]);
}

#[test]
fn truncated_integer() {
    let err = from_bytes::<u32>(&[1, 2, 3]).unwrap_err();

    assert!(err.is_truncation());
    assert!(matches!(err, Error::Truncated { needed: 4, available: 3 }));
}

#[test]
fn truncated_string_reports_total_length() {
    let err = from_bytes::<String>(&[0, 0, 2, 0, b'a', b'b']).unwrap_err();

    assert!(matches!(err, Error::Truncated { needed: 512, available: 2 }));
}

#[test]
fn truncated_vec_fails_instead_of_shortening() {
    let mut bytes = to_bytes(&vec![1u32, 2, 3]).unwrap();
    bytes.truncate(bytes.len() - 1);

    let err = from_bytes::<Vec<u32>>(&bytes).unwrap_err();
    assert!(err.is_truncation());
}

#[test]
fn huge_length_prefix_does_not_allocate_up_front() {
    let err = from_bytes::<Vec<u8>>(&[0xFF, 0xFF, 0xFF, 0xFF, 1]).unwrap_err();
    assert!(err.is_truncation());
}

#[test]
fn invalid_duration_nanos() {
    let mut bytes = to_bytes(&0u64).unwrap();
    bytes.extend_from_slice(&1_000_000_000u32.to_be_bytes());

    assert!(matches!(
        from_bytes::<Duration>(&bytes).unwrap_err(),
        Error::InvalidData(_)
    ));
}

#[test]
fn duplicate_map_keys_are_rejected() {
    let bytes = [0, 0, 0, 2, 1, 10, 1, 20];

    let err = from_bytes::<BTreeMap<u8, u8>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn log_rendering() {
    assert_eq!(to_log_string(&42u16), "42");
    assert_eq!(to_log_string(&-1i8), "-1");
    assert_eq!(to_log_string(&'a'), "'a'");
    assert_eq!(to_log_string(&"hi\n".to_string()), "\"hi\\n\"");
    assert_eq!(to_log_string(&vec![1u8, 2, 3]), "[1, 2, 3]");
    assert_eq!(to_log_string(&Vec::<u8>::new()), "[]");
    assert_eq!(to_log_string(&Some(true)), "Some(true)");
    assert_eq!(to_log_string(&None::<u8>), "None");
    assert_eq!(to_log_string(&(1u8, 'b')), "(1, 'b')");
    assert_eq!(
        to_log_string(&BTreeMap::from([(1u8, 2u8), (3, 4)])),
        "{1: 2, 3: 4}"
    );
}

#[test]
fn short_reads_are_retried_until_full() {
    /// Yields one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    let bytes = to_bytes(&0xDEAD_BEEFu32).unwrap();
    let decoded = u32::decode(&mut Trickle(&bytes)).unwrap();

    assert_eq!(decoded, 0xDEAD_BEEF);
}

#[test]
fn io_errors_propagate_unchanged() {
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    let err = 1u32.encode(&mut Broken).unwrap_err();
    match err {
        Error::Io(error) => {
            assert_eq!(error.kind(), io::ErrorKind::StorageFull);
        }
        other => panic!("unexpected error: {other}"),
    }
}
