//! Demographics table parser.

use csv::StringRecord;
use phetable_types::DemographicRecord;

use crate::parser::{parse, HeaderIndex, TableRecord};
use crate::types::{DemographicColumns, PheResult};

/// Resolved positions of the demographics columns.
#[derive(Debug, Clone, Copy)]
pub struct DemographicPositions {
    id: usize,
    sex: usize,
}

impl TableRecord for DemographicRecord {
    const TABLE: &'static str = "demographics";
    type Layout = DemographicColumns;
    type Columns = DemographicPositions;

    fn bind(headers: &HeaderIndex, layout: &DemographicColumns) -> PheResult<DemographicPositions> {
        Ok(DemographicPositions {
            id: headers.require(&layout.id)?,
            sex: headers.require(&layout.sex)?,
        })
    }

    fn from_record(record: &StringRecord, columns: &DemographicPositions) -> PheResult<Self> {
        Ok(DemographicRecord {
            subject_id: parse::field(record, columns.id).trim().to_string(),
            sex: parse::field(record, columns.sex).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TableParser;
    use std::io::Cursor;

    #[test]
    fn test_parse_demographics_custom_columns() {
        let table = "GRID,GENDER,RACE\nR100 ,F,W\nR200,M,B\n";
        let layout = DemographicColumns {
            id: "GRID".to_string(),
            sex: "GENDER".to_string(),
        };

        let rows = TableParser::<_, DemographicRecord>::from_reader(Cursor::new(table), &layout)
            .unwrap()
            .parse_all()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subject_id, "R100");
        assert_eq!(rows[0].sex, "F");
        assert_eq!(rows[1].sex, "M");
    }
}
