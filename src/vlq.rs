//! Signed base 64 VLQ integers, as used by the `mappings` field.
//!
//! The sign is stored in the least significant bit of the first digit, and every digit carries
//! five value bits plus a continuation bit:
//!
//! ```text
//!   Continuation
//!   |    Sign
//!   |    |
//!   V    V
//!   101011
//! ```

use crate::base64;
use crate::{Error, Result};
#[cfg(feature = "builder")]
use std::io::{self, Write};

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: u128 = 0b11111;
const VLQ_CONTINUATION_BIT: u8 = 0b100000;

// 13 digits carry 65 bits, enough for the magnitude of i64::MIN plus the sign bit.
const MAX_DIGITS: usize = 13;

#[inline]
fn to_vlq_signed(value: i64) -> u128 {
    let magnitude = (value.unsigned_abs() as u128) << 1;
    if value < 0 {
        magnitude | 1
    } else {
        magnitude
    }
}

#[inline]
fn from_vlq_signed(value: u128) -> Result<i64> {
    let magnitude = (value >> 1) as i128;
    let signed = if value & 1 == 1 { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| Error::VarintOverflow)
}

#[inline]
fn write_digits(value: i64, mut push: impl FnMut(u8)) {
    let mut vlq = to_vlq_signed(value);
    loop {
        let mut digit = (vlq & VLQ_BASE_MASK) as usize;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq != 0 {
            digit |= VLQ_CONTINUATION_BIT as usize;
        }
        push(base64::encode_masked(digit));
        if vlq == 0 {
            break;
        }
    }
}

/// Returns the base 64 VLQ encoding of `value`.
pub fn encode(value: i64) -> String {
    let mut encoded = String::with_capacity(2);
    write_digits(value, |digit| encoded.push(digit as char));
    encoded
}

/// Decodes the leading base 64 VLQ value of `input`, returning it with the rest of the input.
pub fn decode(input: &str) -> Result<(i64, &str)> {
    let mut result = 0u128;
    let mut shift = 0;

    for (idx, (offset, ch)) in input.char_indices().enumerate() {
        let digit = base64::decode(ch)?;
        if idx == MAX_DIGITS {
            return Err(Error::VarintOverflow);
        }
        result |= (digit as u128 & VLQ_BASE_MASK) << shift;
        shift += VLQ_BASE_SHIFT;

        if digit & VLQ_CONTINUATION_BIT == 0 {
            let rest = &input[offset + ch.len_utf8()..];
            return Ok((from_vlq_signed(result)?, rest));
        }
    }

    Err(Error::TruncatedVarint)
}

/// Decodes all values of one comma-separated segment of a `mappings` string.
#[derive(Debug)]
pub(crate) struct VlqDecoder {
    buf: [i64; 5],
}

impl VlqDecoder {
    pub fn new() -> Self {
        Self { buf: [0; 5] }
    }

    pub fn decode(&mut self, segment: &str) -> Result<&[i64]> {
        let mut len = 0;
        let mut rest = segment;

        while !rest.is_empty() {
            if len == self.buf.len() {
                return Err(Error::MappingMalformed(segment.to_owned()));
            }
            let (value, remainder) = decode(rest)?;
            self.buf[len] = value;
            len += 1;
            rest = remainder;
        }

        if matches!(len, 1 | 4 | 5) {
            Ok(&self.buf[..len])
        } else {
            Err(Error::MappingMalformed(segment.to_owned()))
        }
    }
}

/// Writes the delta between two consecutive field values as VLQ digits.
#[cfg(feature = "builder")]
#[derive(Debug)]
pub(crate) struct VlqEncoder<'a, W>
where
    W: Write,
{
    writer: &'a mut W,
}

#[cfg(feature = "builder")]
impl<'a, W> VlqEncoder<'a, W>
where
    W: Write,
{
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }

    pub fn encode(&mut self, prev: u32, cur: u32) -> io::Result<()> {
        let mut digits = [0u8; MAX_DIGITS];
        let mut len = 0;
        write_digits(cur as i64 - prev as i64, |digit| {
            digits[len] = digit;
            len += 1;
        });
        self.writer.write_all(&digits[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, VlqDecoder};
    use crate::Error;

    #[test]
    fn test_vlq_known_values() {
        assert_eq!(encode(0), "A");
        assert_eq!(encode(1), "C");
        assert_eq!(encode(-1), "D");
        assert_eq!(encode(15), "e");
        assert_eq!(encode(16), "gB");
        assert_eq!(encode(-16), "hB");
        assert_eq!(encode(123), "2H");

        assert_eq!(decode("2HAB").unwrap(), (123, "AB"));
        assert_eq!(decode("hB").unwrap(), (-16, ""));
    }

    #[test]
    fn test_vlq_round_trip() {
        let extremes = [
            i64::MIN,
            i64::MIN + 1,
            i64::MAX,
            i32::MIN as i64,
            i32::MAX as i64,
            u32::MAX as i64,
            -(u32::MAX as i64),
        ];
        for value in extremes.into_iter().chain((-100_000..100_000).step_by(7)) {
            let encoded = encode(value);
            assert_eq!(decode(&encoded).unwrap(), (value, ""), "{value}");
        }
    }

    #[test]
    fn test_vlq_decode_malformed() {
        assert!(matches!(decode(""), Err(Error::TruncatedVarint)));
        assert!(matches!(decode("g"), Err(Error::TruncatedVarint)));
        assert!(matches!(decode("!A"), Err(Error::InvalidDigit('!'))));
        assert!(matches!(decode("你好"), Err(Error::InvalidDigit('你'))));
        // a terminated value leaves trailing garbage to the caller
        assert_eq!(decode("A!").unwrap(), (0, "!"));
        // 14 digits
        assert!(matches!(decode("ggggggggggggggB"), Err(Error::VarintOverflow)));
        // 13 digits, but the magnitude exceeds i64
        assert!(matches!(decode("////////////f"), Err(Error::VarintOverflow)));
    }

    #[test]
    fn test_vlq_segment_decoder() {
        let mut decoder = VlqDecoder::new();
        assert_eq!(decoder.decode("AAAA").unwrap(), &[0, 0, 0, 0]);
        assert_eq!(decoder.decode("KAAEA").unwrap(), &[5, 0, 0, 2, 0]);
        assert_eq!(decoder.decode("Q").unwrap(), &[8]);
        assert!(matches!(
            decoder.decode("AA"),
            Err(Error::MappingMalformed(..))
        ));
        assert!(matches!(
            decoder.decode("AAAAAA"),
            Err(Error::MappingMalformed(..))
        ));
        assert!(matches!(
            decoder.decode("AAg"),
            Err(Error::TruncatedVarint)
        ));
    }

    #[cfg(feature = "builder")]
    #[test]
    fn test_vlq_encoder_writes_deltas() {
        use super::VlqEncoder;

        let mut buf = Vec::new();
        let mut encoder = VlqEncoder::new(&mut buf);
        encoder.encode(0, 0).unwrap();
        encoder.encode(10, 5).unwrap();
        encoder.encode(5, 21).unwrap();
        assert_eq!(&buf, b"ALgB");
    }
}
