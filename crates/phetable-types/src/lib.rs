//! # phetable-types
//!
//! Type definitions for turning ICD diagnosis streams into phecode
//! case/control tables.
//!
//! This crate provides the plain data structures shared by the loader and
//! the command-line front end: reference-table rows (ICD to phecode
//! translation, phecode rollups, gender restrictions), per-subject input
//! records, and the classification outcome types.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use phetable_types::{Classification, EffectiveCount, IcdEra, TranslationRow};
//!
//! let row = TranslationRow {
//!     code: "E11.9".to_string(),
//!     vocabulary_id: "ICD10CM".to_string(),
//!     phecode: "250.2".to_string(),
//! };
//! assert_eq!(row.era(), Some(IcdEra::Icd10));
//!
//! let outcome = Classification::from_count(EffectiveCount::Count(3), 2);
//! assert_eq!(outcome.as_str(), "TRUE");
//! ```

#![warn(missing_docs)]

mod classification;
mod era;
mod phecode;
mod record;
mod restriction;
mod rollup;
mod sex;
mod translation;
pub mod well_known;

// Re-export all public types at crate root
pub use classification::{Classification, EffectiveCount};
pub use era::IcdEra;
pub use phecode::{PheIndex, Phecode};
pub use record::{DemographicRecord, DiagnosisRecord};
pub use restriction::RestrictionRow;
pub use rollup::RollupRow;
pub use sex::{Sex, SexCoding};
pub use translation::TranslationRow;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        // Verify all types are accessible from crate root
        let _idx: PheIndex = 0;
        let _phecode: Phecode = "250.2".to_string();
        let _era = IcdEra::Icd9;
        let _sex = Sex::Female;
        let _class = Classification::NotApplicable;
        let _count = EffectiveCount::Count(0);
    }

    #[test]
    fn test_well_known_accessible() {
        assert_eq!(well_known::DEFAULT_MIN_COUNT, 2);
        assert_eq!(well_known::DEFAULT_MALE_CODE, "M");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let record = DiagnosisRecord {
            subject_id: "A1".to_string(),
            age: Some("40".to_string()),
            code: "E11.9".to_string(),
            era_flag: "10".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: DiagnosisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
