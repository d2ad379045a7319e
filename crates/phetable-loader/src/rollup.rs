//! Phecode rollup table parser.
//!
//! Columns: `code` (child phecode), `phecode_unrolled` (parent phecode).

use csv::StringRecord;
use phetable_types::{well_known, RollupRow};

use crate::parser::{parse, HeaderIndex, TableRecord};
use crate::types::PheResult;

/// Resolved positions of the rollup table columns.
#[derive(Debug, Clone, Copy)]
pub struct RollupColumns {
    child: usize,
    parent: usize,
}

impl TableRecord for RollupRow {
    const TABLE: &'static str = "rollup";
    type Layout = ();
    type Columns = RollupColumns;

    fn bind(headers: &HeaderIndex, _layout: &()) -> PheResult<RollupColumns> {
        Ok(RollupColumns {
            child: headers.require(well_known::ROLLUP_CHILD_COLUMN)?,
            parent: headers.require(well_known::ROLLUP_PARENT_COLUMN)?,
        })
    }

    fn from_record(record: &StringRecord, columns: &RollupColumns) -> PheResult<Self> {
        Ok(RollupRow {
            child: parse::field(record, columns.child).to_string(),
            parent: parse::field(record, columns.parent).to_string(),
        })
    }
}
