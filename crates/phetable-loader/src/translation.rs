//! ICD to phecode translation table parser.
//!
//! Columns: `code`, `vocabulary_id`, `phecode`.

use csv::StringRecord;
use phetable_types::{well_known, TranslationRow};

use crate::parser::{parse, HeaderIndex, TableRecord};
use crate::types::PheResult;

/// Resolved positions of the translation table columns.
#[derive(Debug, Clone, Copy)]
pub struct TranslationColumns {
    code: usize,
    vocabulary_id: usize,
    phecode: usize,
}

impl TableRecord for TranslationRow {
    const TABLE: &'static str = "translation";
    type Layout = ();
    type Columns = TranslationColumns;

    fn bind(headers: &HeaderIndex, _layout: &()) -> PheResult<TranslationColumns> {
        Ok(TranslationColumns {
            code: headers.require(well_known::TRANSLATION_CODE_COLUMN)?,
            vocabulary_id: headers.require(well_known::TRANSLATION_VOCABULARY_COLUMN)?,
            phecode: headers.require(well_known::TRANSLATION_PHECODE_COLUMN)?,
        })
    }

    fn from_record(record: &StringRecord, columns: &TranslationColumns) -> PheResult<Self> {
        Ok(TranslationRow {
            code: parse::field(record, columns.code).to_string(),
            vocabulary_id: parse::field(record, columns.vocabulary_id).to_string(),
            phecode: parse::field(record, columns.phecode).to_string(),
        })
    }
}
