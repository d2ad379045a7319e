//! Gender restriction table parser and lookup.
//!
//! Columns: `phecode`, `male_only`, `female_only`.

use std::collections::HashSet;

use csv::StringRecord;
use phetable_types::{well_known, Phecode, RestrictionRow, Sex};

use crate::parser::{parse, HeaderIndex, TableRecord};
use crate::types::PheResult;

/// Resolved positions of the restriction table columns.
#[derive(Debug, Clone, Copy)]
pub struct RestrictionColumns {
    phecode: usize,
    male_only: usize,
    female_only: usize,
}

impl TableRecord for RestrictionRow {
    const TABLE: &'static str = "restriction";
    type Layout = ();
    type Columns = RestrictionColumns;

    fn bind(headers: &HeaderIndex, _layout: &()) -> PheResult<RestrictionColumns> {
        Ok(RestrictionColumns {
            phecode: headers.require(well_known::RESTRICTION_PHECODE_COLUMN)?,
            male_only: headers.require(well_known::RESTRICTION_MALE_COLUMN)?,
            female_only: headers.require(well_known::RESTRICTION_FEMALE_COLUMN)?,
        })
    }

    fn from_record(record: &StringRecord, columns: &RestrictionColumns) -> PheResult<Self> {
        Ok(RestrictionRow {
            phecode: parse::field(record, columns.phecode).to_string(),
            male_only: parse::flag(
                parse::field(record, columns.male_only),
                well_known::RESTRICTION_MALE_COLUMN,
            )?,
            female_only: parse::flag(
                parse::field(record, columns.female_only),
                well_known::RESTRICTION_FEMALE_COLUMN,
            )?,
        })
    }
}

/// Phecodes that only apply to one sex.
#[derive(Debug, Clone, Default)]
pub struct GenderRestrictions {
    female_only: HashSet<Phecode>,
    male_only: HashSet<Phecode>,
}

impl GenderRestrictions {
    /// Creates an empty restriction set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the restrictions named by a row.
    pub fn add(&mut self, row: &RestrictionRow) {
        if row.female_only {
            self.female_only.insert(row.phecode.clone());
        }
        if row.male_only {
            self.male_only.insert(row.phecode.clone());
        }
    }

    /// Marks a phecode as female-only.
    pub fn add_female_only(&mut self, phecode: impl Into<Phecode>) {
        self.female_only.insert(phecode.into());
    }

    /// Marks a phecode as male-only.
    pub fn add_male_only(&mut self, phecode: impl Into<Phecode>) {
        self.male_only.insert(phecode.into());
    }

    /// Returns true if the phecode does not apply to a subject of this sex.
    ///
    /// Subjects without demographics (`None`) and subjects with an
    /// unrecognized sex code are never restricted.
    pub fn is_restricted(&self, phecode: &str, sex: Option<Sex>) -> bool {
        match sex {
            None | Some(Sex::Unrecognized) => false,
            Some(sex) => {
                (sex != Sex::Female && self.female_only.contains(phecode))
                    || (sex != Sex::Male && self.male_only.contains(phecode))
            }
        }
    }

    /// Returns the number of female-only phecodes.
    pub fn female_only_count(&self) -> usize {
        self.female_only.len()
    }

    /// Returns the number of male-only phecodes.
    pub fn male_only_count(&self) -> usize {
        self.male_only.len()
    }

    /// Returns true if no phecode is restricted.
    pub fn is_empty(&self) -> bool {
        self.female_only.is_empty() && self.male_only.is_empty()
    }
}
