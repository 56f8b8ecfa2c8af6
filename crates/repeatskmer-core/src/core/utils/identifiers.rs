use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResidueKeyError {
    #[error("Malformed residue identifier '{raw}': {reason}")]
    MalformedIdentifier { raw: String, reason: &'static str },
}

/// Canonical identifier of a residue position: a signed sequence number plus an
/// optional insertion code (one or more trailing letters).
///
/// Keys order naturally: numeric runs compare as signed integers and the letter
/// run compares by code point, so `-5 < 9 < 10 < 10A < 10B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueKey {
    number: isize,
    insertion: String,
}

impl ResidueKey {
    /// Builds a key from a sequence number and an optional insertion code.
    ///
    /// # Errors
    ///
    /// Returns [`ResidueKeyError::MalformedIdentifier`] if the insertion code is
    /// not alphabetic.
    pub fn new(number: isize, insertion_code: Option<char>) -> Result<Self, ResidueKeyError> {
        match insertion_code {
            None => Ok(Self {
                number,
                insertion: String::new(),
            }),
            Some(code) if code.is_ascii_alphabetic() => Ok(Self {
                number,
                insertion: code.to_string(),
            }),
            Some(code) => Err(ResidueKeyError::MalformedIdentifier {
                raw: format!("{}{}", number, code),
                reason: "insertion code must be a letter",
            }),
        }
    }

    /// Parses an identifier such as `"-5"`, `"10"` or `"10A"`.
    ///
    /// The identifier is scanned into a leading digit run (optionally prefixed
    /// by a single `-`) followed by a trailing letter run; any other shape is
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self, ResidueKeyError> {
        let trimmed = raw.trim();
        let malformed = |reason| ResidueKeyError::MalformedIdentifier {
            raw: raw.to_string(),
            reason,
        };

        let (sign, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, trimmed),
        };

        let digit_len = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        if digit_len == 0 {
            return Err(malformed("expected a numeric sequence number"));
        }

        let (digits, letters) = unsigned.split_at(digit_len);
        if !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(malformed("only letters may follow the sequence number"));
        }

        let magnitude: isize = digits
            .parse()
            .map_err(|_| malformed("sequence number out of range"))?;

        Ok(Self {
            number: sign * magnitude,
            insertion: letters.to_string(),
        })
    }

    pub fn number(&self) -> isize {
        self.number
    }

    pub fn insertion(&self) -> &str {
        &self.insertion
    }

    /// Returns a copy of this key with an extra letter suffix derived from
    /// `ordinal` (0 → `A`, 25 → `Z`, 26 → `AA`, ...).
    pub fn with_suffix(&self, ordinal: usize) -> Self {
        let mut suffix = Vec::new();
        let mut n = ordinal + 1;
        while n > 0 {
            n -= 1;
            suffix.push((b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        let mut insertion = self.insertion.clone();
        insertion.extend(suffix.into_iter().rev());
        Self {
            number: self.number,
            insertion,
        }
    }
}

impl Ord for ResidueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.insertion.cmp(&other.insertion))
    }
}

impl PartialOrd for ResidueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for ResidueKey {
    type Err = ResidueKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.insertion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> ResidueKey {
        ResidueKey::parse(raw).unwrap()
    }

    #[test]
    fn parse_accepts_plain_negative_and_inserted_identifiers() {
        assert_eq!(key("10").number(), 10);
        assert_eq!(key("10").insertion(), "");
        assert_eq!(key("-5").number(), -5);
        assert_eq!(key("10A").insertion(), "A");
        assert_eq!(key(" 27B ").to_string(), "27B");
    }

    #[test]
    fn parse_rejects_malformed_identifiers() {
        for raw in ["", "-", "A10", "10-", "1A2", "--3", "10 A", "5.0"] {
            assert!(
                matches!(
                    ResidueKey::parse(raw),
                    Err(ResidueKeyError::MalformedIdentifier { .. })
                ),
                "'{}' should be rejected",
                raw
            );
        }
    }

    #[test]
    fn natural_order_sorts_numbers_numerically_then_insertion_codes() {
        let mut keys: Vec<_> = ["10A", "9", "10", "-5"].iter().map(|r| key(r)).collect();
        keys.sort();
        let sorted: Vec<_> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, vec!["-5", "9", "10", "10A"]);
    }

    #[test]
    fn empty_insertion_code_sorts_before_any_letter() {
        assert!(key("10") < key("10A"));
        assert!(key("10A") < key("10B"));
        assert!(key("10Z") < key("11"));
    }

    #[test]
    fn new_rejects_non_letter_insertion_codes() {
        assert_eq!(ResidueKey::new(3, Some('B')).unwrap(), key("3B"));
        assert_eq!(ResidueKey::new(3, None).unwrap(), key("3"));
        assert!(ResidueKey::new(3, Some('1')).is_err());
        assert!(ResidueKey::new(3, Some(' ')).is_err());
    }

    #[test]
    fn with_suffix_extends_the_insertion_code_in_sort_order() {
        let base = key("7");
        assert_eq!(base.with_suffix(0).to_string(), "7A");
        assert_eq!(base.with_suffix(25).to_string(), "7Z");
        assert_eq!(base.with_suffix(26).to_string(), "7AA");
        assert_eq!(key("7B").with_suffix(1).to_string(), "7BB");
        assert!(base < base.with_suffix(0));
        assert!(base.with_suffix(0) < base.with_suffix(1));
    }
}
