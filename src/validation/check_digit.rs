// ICAO Doc 9303 check digits (Part 3, section 4.9)

use crate::utils::{MrzError, Result};

pub const WEIGHTS: [u32; 3] = [7, 3, 1];

/// Numeric value of an MRZ symbol: digits as themselves, `A`..`Z` as 10..35,
/// filler `<` as 0. Anything else is outside the MRZ alphabet.
pub fn char_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        '<' => Some(0),
        _ => None,
    }
}

pub fn weight(position: usize) -> u32 {
    WEIGHTS[position % 3]
}

/// Computes the check digit of `value` as a number in `0..=9`.
pub fn compute(value: &str) -> Result<u32> {
    let mut total = 0u32;
    for (i, c) in value.chars().enumerate() {
        let v = char_value(c).ok_or_else(|| {
            MrzError::MalformedField(format!(
                "character {:?} at position {} of {:?} is not an MRZ symbol",
                c, i, value
            ))
        })?;
        total += v * weight(i);
    }
    Ok(total % 10)
}

pub fn compute_char(value: &str) -> Result<char> {
    let digit = compute(value)?;
    Ok(char::from(b'0' + digit as u8))
}

/// Verifies `value` against its embedded check character.
pub fn verify(field: &str, value: &str, check: char) -> Result<()> {
    let expected = compute_char(value)?;
    if expected != check {
        return Err(MrzError::ChecksumMismatch {
            field: field.to_string(),
            expected,
            found: check,
        });
    }
    Ok(())
}
