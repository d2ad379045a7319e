//! Subject sex and its configurable encoding.

use crate::well_known;

/// Sex of a subject as decoded from a demographics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sex {
    /// Matches the configured male code.
    Male,
    /// Matches the configured female code.
    Female,
    /// Present but matches neither code. Never restricts a phecode.
    Unrecognized,
}

/// The tokens used to encode male and female in a demographics table.
///
/// # Examples
///
/// ```
/// use phetable_types::{Sex, SexCoding};
///
/// let coding = SexCoding::default();
/// assert_eq!(coding.decode("F"), Sex::Female);
/// assert_eq!(coding.decode(" M "), Sex::Male);
/// assert_eq!(coding.decode("U"), Sex::Unrecognized);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SexCoding {
    /// Token for male subjects.
    pub male: String,
    /// Token for female subjects.
    pub female: String,
}

impl Default for SexCoding {
    fn default() -> Self {
        Self {
            male: well_known::DEFAULT_MALE_CODE.to_string(),
            female: well_known::DEFAULT_FEMALE_CODE.to_string(),
        }
    }
}

impl SexCoding {
    /// Creates a coding from explicit tokens.
    pub fn new(male: impl Into<String>, female: impl Into<String>) -> Self {
        Self {
            male: male.into(),
            female: female.into(),
        }
    }

    /// Decodes a raw sex value. Surrounding whitespace is ignored.
    pub fn decode(&self, raw: &str) -> Sex {
        let raw = raw.trim();
        if raw == self.female {
            Sex::Female
        } else if raw == self.male {
            Sex::Male
        } else {
            Sex::Unrecognized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_coding() {
        let coding = SexCoding::new("1", "2");
        assert_eq!(coding.decode("1"), Sex::Male);
        assert_eq!(coding.decode("2"), Sex::Female);
        assert_eq!(coding.decode("M"), Sex::Unrecognized);
    }
}
