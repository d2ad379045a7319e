//! ICD revision ("era") type.

use std::fmt;

/// The ICD revision a diagnosis code belongs to.
///
/// ICD-9 and ICD-10 codes can collide syntactically, so every code is
/// always paired with its era.
///
/// # Examples
///
/// ```
/// use phetable_types::IcdEra;
///
/// assert_eq!(IcdEra::search("ICD10CM"), Some(IcdEra::Icd10));
/// assert_eq!(IcdEra::search("ICD9CM"), Some(IcdEra::Icd9));
/// assert_eq!(IcdEra::search("SNOMED"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IcdEra {
    /// ICD-9 (including ICD-9-CM).
    Icd9,
    /// ICD-10 (including ICD-10-CM).
    Icd10,
}

impl IcdEra {
    /// Finds the era token embedded in a free-form value.
    ///
    /// Vocabulary ids and era flags come in many spellings (`9`, `10`,
    /// `ICD9CM`, `ICD10CM`, ...). The leftmost occurrence of `9` or `10`
    /// decides the era.
    pub fn search(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'9' {
                return Some(Self::Icd9);
            }
            if b == b'1' && bytes.get(i + 1) == Some(&b'0') {
                return Some(Self::Icd10);
            }
        }
        None
    }

    /// Returns the revision number (9 or 10).
    pub fn number(self) -> u8 {
        match self {
            Self::Icd9 => 9,
            Self::Icd10 => 10,
        }
    }
}

impl fmt::Display for IcdEra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
