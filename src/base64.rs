//! The 64-symbol alphabet VLQ digits are drawn from.

use crate::{Error, Result};

const BASE64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const BASE64_VALUES: [i8; 128] = get_base64_map();

const fn get_base64_map() -> [i8; 128] {
    let mut res = [-1i8; 128];
    // `for in` is not allowed in const fn
    let mut idx = 0;
    while idx < 64 {
        res[BASE64_CHARS[idx] as usize] = idx as i8;
        idx += 1;
    }
    res
}

/// Encodes an integer in the range of 0 to 63 to a single base 64 digit.
#[inline]
pub fn encode(value: u8) -> Result<char> {
    BASE64_CHARS
        .get(value as usize)
        .map(|&b| b as char)
        .ok_or(Error::DigitOutOfRange(value))
}

/// Decodes a single base 64 digit to an integer.
#[inline]
pub fn decode(digit: char) -> Result<u8> {
    if digit.is_ascii() {
        let value = BASE64_VALUES[digit as usize];
        if value >= 0 {
            return Ok(value as u8);
        }
    }
    Err(Error::InvalidDigit(digit))
}

/// Same as [encode], for callers that already masked `value` to six bits.
#[inline(always)]
pub(crate) fn encode_masked(value: usize) -> u8 {
    BASE64_CHARS[value & 0b111111]
}
