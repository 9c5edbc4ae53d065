/// A reading multiplied by 10, e.g. `-12.3` is `-123`.
pub type ScaledInt = i16;

/// Longest value span: `-99.9`.
pub const MAX_VALUE_LEN: usize = 5;

/// Parses `d.d` or `dd.d`, optionally prefixed with `-`, into a [`ScaledInt`].
///
/// The shape is a precondition and is not validated. Any other input returns
/// an unspecified value (and trips an assertion in debug builds).
#[inline]
pub fn parse_scaled(bytes: &[u8]) -> ScaledInt {
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, bytes),
    };

    // the '.' is skipped positionally, never inspected
    let magnitude = match *digits {
        [ones, _, tenths] => ones as i16 * 10 + tenths as i16 - b'0' as i16 * 11,
        [tens, ones, _, tenths] => {
            tens as i16 * 100 + ones as i16 * 10 + tenths as i16 - b'0' as i16 * 111
        }
        _ => {
            debug_assert!(false, "unsupported value shape: {bytes:?}");
            0
        }
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod test {
    use super::parse_scaled;

    #[test]
    fn parses_supported_shapes() {
        for (input, expected) in [
            ("-99.9", -999),
            ("-10.5", -105),
            ("-0.1", -1),
            ("0.0", 0),
            ("0.1", 1),
            ("10.5", 105),
            ("99.9", 999),
        ] {
            assert_eq!(
                expected,
                parse_scaled(input.as_bytes()),
                "parsing produced wrong number for `{input}`"
            );
        }
    }

    #[test]
    fn negative_zero_is_zero() {
        assert_eq!(0, parse_scaled(b"-0.0"));
    }

    #[test]
    fn every_representable_value() {
        for scaled in -999i16..=999 {
            let text = format!(
                "{}{}.{}",
                if scaled < 0 { "-" } else { "" },
                scaled.abs() / 10,
                scaled.abs() % 10
            );
            assert_eq!(scaled, parse_scaled(text.as_bytes()), "input: `{text}`");
        }
    }
}
