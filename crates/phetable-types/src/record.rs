//! Per-subject input records.

/// One row of the diagnosis stream.
///
/// Values are kept raw; interpretation (age parsing, era resolution, code
/// lookup) happens in the record stream driver so that failures can be
/// tallied per record instead of aborting the read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosisRecord {
    /// Subject identifier, trimmed.
    pub subject_id: String,
    /// Raw age at diagnosis. `None` when the stream has no age column.
    pub age: Option<String>,
    /// Raw ICD code.
    pub code: String,
    /// Raw era flag (`9`, `10`, `ICD10CM`, ...). May be blank.
    pub era_flag: String,
}

impl DiagnosisRecord {
    /// Returns true if the era flag is blank.
    pub fn has_blank_era(&self) -> bool {
        self.era_flag.trim().is_empty()
    }
}

/// One row of the demographics table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DemographicRecord {
    /// Subject identifier, trimmed.
    pub subject_id: String,
    /// Raw sex code.
    pub sex: String,
}
