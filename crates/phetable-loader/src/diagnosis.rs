//! Diagnosis stream parser.
//!
//! Column names are configurable. The age column is optional: when it is
//! absent every record carries `age: None`.

use csv::StringRecord;
use phetable_types::DiagnosisRecord;

use crate::parser::{parse, HeaderIndex, TableRecord};
use crate::types::{DiagnosisColumns, PheResult};

/// Resolved positions of the diagnosis stream columns.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosisPositions {
    id: usize,
    age: Option<usize>,
    code: usize,
    era: usize,
}

impl DiagnosisPositions {
    /// Returns true if the stream has an age column.
    pub fn has_age(&self) -> bool {
        self.age.is_some()
    }
}

impl TableRecord for DiagnosisRecord {
    const TABLE: &'static str = "diagnosis";
    type Layout = DiagnosisColumns;
    type Columns = DiagnosisPositions;

    fn bind(headers: &HeaderIndex, layout: &DiagnosisColumns) -> PheResult<DiagnosisPositions> {
        Ok(DiagnosisPositions {
            id: headers.require(&layout.id)?,
            age: headers.optional(&layout.age),
            code: headers.require(&layout.code)?,
            era: headers.require(&layout.era)?,
        })
    }

    fn from_record(record: &StringRecord, columns: &DiagnosisPositions) -> PheResult<Self> {
        Ok(DiagnosisRecord {
            subject_id: parse::field(record, columns.id).trim().to_string(),
            age: columns
                .age
                .map(|position| parse::field(record, position).to_string()),
            code: parse::field(record, columns.code).to_string(),
            era_flag: parse::field(record, columns.era).to_string(),
        })
    }
}
