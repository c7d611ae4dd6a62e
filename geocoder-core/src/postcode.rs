//! UK postcode validation and canonical formatting.

use std::sync::LazyLock;

use regex::Regex;

/// Compact (whitespace-free, upper-case) UK postcode shape: an outward code of
/// one or two letters, a digit, and an optional letter or digit, followed by
/// an inward code of a digit and two letters. `GIR 0AA` is the one historic
/// exception.
static COMPACT_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:GIR0AA|[A-Z]{1,2}[0-9][A-Z0-9]?[0-9][A-Z]{2})$")
        .unwrap_or_else(|err| panic!("postcode pattern must compile: {err}"))
});

/// Length of the inward code that follows the separating space.
const INWARD_CODE_LEN: usize = 3;

/// Raw postcode input awaiting validation and normalisation.
///
/// # Examples
/// ```
/// use geocoder_core::Postcode;
///
/// let postcode = Postcode::new("sw1A2aa");
/// assert!(postcode.is_valid());
/// assert_eq!(postcode.formatted(), "SW1A 2AA");
///
/// assert!(!Postcode::new("not a postcode").is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postcode {
    raw: String,
    compact: String,
}

impl Postcode {
    /// Wrap raw user input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let compact = raw
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect();
        Self { raw, compact }
    }

    /// The input exactly as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the input is a syntactically valid UK postcode.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        COMPACT_POSTCODE.is_match(&self.compact)
    }

    /// Canonical form used as the store key: upper case with a single space
    /// before the inward code.
    ///
    /// Inputs too short to carry an inward code come back compacted.
    #[must_use]
    pub fn formatted(&self) -> String {
        let Some(split) = self.compact.len().checked_sub(INWARD_CODE_LEN) else {
            return self.compact.clone();
        };
        if split == 0 || !self.compact.is_char_boundary(split) {
            return self.compact.clone();
        }
        let (outward, inward) = self.compact.split_at(split);
        format!("{outward} {inward}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AB1 0AG", "AB1 0AG")]
    #[case("sw1A2aa", "SW1A 2AA")]
    #[case("  m1   1ae ", "M1 1AE")]
    #[case("EC1A1BB", "EC1A 1BB")]
    #[case("W1A 0AX", "W1A 0AX")]
    #[case("gir0aa", "GIR 0AA")]
    fn formats_valid_postcodes(#[case] input: &str, #[case] expected: &str) {
        let postcode = Postcode::new(input);
        assert!(postcode.is_valid(), "{input} should be valid");
        assert_eq!(postcode.formatted(), expected);
    }

    #[rstest]
    #[case("not a postcode")]
    #[case("")]
    #[case("12345")]
    #[case("AB1")]
    #[case("ABC1 0AG")]
    #[case("AB1 0A1")]
    fn rejects_invalid_postcodes(#[case] input: &str) {
        assert!(!Postcode::new(input).is_valid(), "{input} should be invalid");
    }

    #[rstest]
    #[case("ab", "AB")]
    #[case("abc", "ABC")]
    fn short_inputs_are_compacted_without_space(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Postcode::new(input).formatted(), expected);
    }

    #[rstest]
    fn keeps_raw_input() {
        assert_eq!(Postcode::new("sw1A2aa").raw(), "sw1A2aa");
    }
}
