//! # General Utilities Module
//!
//! Verbose or repeated routines shared across this crate that do not belong
//! to any single module.

/* BIT FIELDS */

/// Returns the minimum number of bits required to represent unsigned `val`.
#[inline(always)]
pub const fn min_ubits(val: u64) -> usize {
    (u64::BITS - val.leading_zeros()) as usize
}

/* STRING HELPERS */

/// Returns the most similar string to `model` among `all`. Used to suggest
/// corrections for malformed CLI input. Assumes `all` is not empty.
pub fn most_similar(model: &str, all: &[&str]) -> String {
    all.iter()
        .min_by_key(|s| strsim::damerau_levenshtein(model, s))
        .expect("`all` must not be empty")
        .to_string()
}

/// Renders `encoding` the way the strategy and reachability stores key their
/// entries: lowercase hexadecimal, no leading zeros, no `0x` prefix.
#[inline(always)]
pub fn encode_hex(encoding: u32) -> String {
    format!("{encoding:x}")
}

/// Parses a key produced by [`encode_hex`] back into its numeric form.
pub fn decode_hex(hex: &str) -> Result<u32, std::num::ParseIntError> {
    u32::from_str_radix(hex, 16)
}

/* NUMERIC HELPERS */

/// Rounds `value` to `digits` decimal places. Used to give stored
/// probabilities and values a stable, storage-friendly precision instead of
/// carrying LP solver noise into the chunked strategy store.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod round_tests {
    use super::round_to;

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(round_to(0.123_456_789, 6), 0.123_457);
        assert_eq!(round_to(1.0 / 3.0, 2), 0.33);
        assert_eq!(round_to(-0.000_001, 6), -0.000_001);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_bits_for_unsigned_integer() {
        assert_eq!(min_ubits(0), 0);
        assert_eq!(min_ubits(0b1111_1111), 8);
        assert_eq!(min_ubits(0b0000_0001), 1);
        assert_eq!(min_ubits(0xFFFF_FFFF), 32);
    }

    #[test]
    fn hex_round_trips() {
        let values = [0u32, 1, 0xFF, 0x0FFF_0000, 0xFFFF_FFFF];
        for &v in &values {
            assert_eq!(decode_hex(&encode_hex(v)).unwrap(), v);
        }
    }

    #[test]
    fn hex_has_no_prefix_or_leading_zeros() {
        assert_eq!(encode_hex(0), "0");
        assert_eq!(encode_hex(255), "ff");
        assert!(!encode_hex(255).starts_with("0x"));
    }

    #[test]
    fn most_similar_picks_closest() {
        let options = ["solve", "status", "init"];
        assert_eq!(most_similar("solv", &options), "solve");
        assert_eq!(most_similar("stat", &options), "status");
    }
}
