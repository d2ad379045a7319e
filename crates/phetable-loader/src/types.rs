//! Error, configuration and statistics types for phetable runs.

use std::path::PathBuf;

use phetable_types::{well_known, IcdEra, SexCoding};
use thiserror::Error;

/// Errors that can occur while building a phecode table.
#[derive(Error, Debug)]
pub enum PheError {
    /// I/O error reading or writing a table.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Missing required column in a table header.
    #[error("Missing required column '{column}' in {table} table")]
    MissingColumn {
        /// The table being read.
        table: &'static str,
        /// The name of the missing column.
        column: String,
    },

    /// A phecode referenced by the reference tables is not in the vocabulary.
    #[error("Phecode '{phecode}' not found in the finalized vocabulary")]
    UnknownPhecode {
        /// The phecode that could not be located.
        phecode: String,
    },

    /// A diagnosis code has no translation for its era.
    #[error("Unknown ICD-{era} code '{code}'")]
    UnknownCode {
        /// Era the code was looked up under.
        era: IcdEra,
        /// The raw code.
        code: String,
    },

    /// Invalid boolean flag in the restriction table.
    #[error("Invalid value '{value}' in column {column} (expected TRUE or FALSE)")]
    InvalidFlag {
        /// The column holding the flag.
        column: &'static str,
        /// The invalid value.
        value: String,
    },

    /// Invalid run configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for phetable operations.
pub type PheResult<T> = Result<T, PheError>;

/// Column names of the diagnosis stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisColumns {
    /// Subject id column.
    pub id: String,
    /// Age column. Optional in the data; see [`well_known::MISSING_AGE_COLUMN_AGE`].
    pub age: String,
    /// ICD code column.
    pub code: String,
    /// Era flag column.
    pub era: String,
}

impl Default for DiagnosisColumns {
    fn default() -> Self {
        Self {
            id: well_known::DEFAULT_ID_COLUMN.to_string(),
            age: well_known::DEFAULT_AGE_COLUMN.to_string(),
            code: well_known::DEFAULT_CODE_COLUMN.to_string(),
            era: well_known::DEFAULT_ERA_COLUMN.to_string(),
        }
    }
}

/// Column names of the demographics table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemographicColumns {
    /// Subject id column.
    pub id: String,
    /// Sex column.
    pub sex: String,
}

impl Default for DemographicColumns {
    fn default() -> Self {
        Self {
            id: well_known::DEFAULT_ID_COLUMN.to_string(),
            sex: well_known::DEFAULT_SEX_COLUMN.to_string(),
        }
    }
}

/// Configuration for one phetable run.
#[derive(Debug, Clone)]
pub struct PhetableConfig {
    /// Minimum effective count for a case call.
    pub min_count: u32,
    /// Records with a lower age at diagnosis are not counted.
    pub min_age: f64,
    /// Male/female tokens in the demographics table.
    pub sex_coding: SexCoding,
    /// Diagnosis stream column names.
    pub diagnosis_columns: DiagnosisColumns,
    /// Demographics table column names.
    pub demographic_columns: DemographicColumns,
    /// Diagnosis records between progress log lines.
    pub progress_interval: usize,
    /// Subjects classified per batch during emission.
    pub batch_size: usize,
}

impl Default for PhetableConfig {
    fn default() -> Self {
        Self {
            min_count: well_known::DEFAULT_MIN_COUNT,
            min_age: well_known::DEFAULT_MIN_AGE,
            sex_coding: SexCoding::default(),
            diagnosis_columns: DiagnosisColumns::default(),
            demographic_columns: DemographicColumns::default(),
            progress_interval: well_known::DEFAULT_PROGRESS_INTERVAL,
            batch_size: well_known::DEFAULT_BATCH_SIZE,
        }
    }
}

impl PhetableConfig {
    /// Checks the settings that would make a run meaningless.
    pub fn validate(&self) -> PheResult<()> {
        if self.min_count == 0 {
            return Err(PheError::InvalidConfig(
                "minimum case count must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(PheError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if !self.min_age.is_finite() {
            return Err(PheError::InvalidConfig(format!(
                "minimum age must be a finite number, got {}",
                self.min_age
            )));
        }
        Ok(())
    }
}

/// Locations of the reference tables.
#[derive(Debug, Clone, Default)]
pub struct ReferencePaths {
    /// ICD to phecode translation table.
    pub translation: PathBuf,
    /// Phecode rollup table.
    pub rollup: PathBuf,
    /// Optional gender restriction table.
    pub restrictions: Option<PathBuf>,
}

/// Output file settings.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Prefix shared by all output files.
    pub prefix: String,
    /// Gzip the classification table.
    pub compress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: well_known::DEFAULT_OUTPUT_PREFIX.to_string(),
            compress: true,
        }
    }
}

impl OutputConfig {
    /// Path of the classification table.
    pub fn phetable_path(&self) -> PathBuf {
        if self.compress {
            PathBuf::from(format!("{}-phetable.txt.gz", self.prefix))
        } else {
            PathBuf::from(format!("{}-phetable.txt", self.prefix))
        }
    }

    /// Path of the unresolved code report.
    pub fn missing_report_path(&self) -> PathBuf {
        PathBuf::from(format!("{}-no-matching-phe.txt", self.prefix))
    }
}

/// Statistics from streaming the diagnosis table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Total diagnosis records read.
    pub records_read: usize,
    /// Records resolved and added to a subject.
    pub records_counted: usize,
    /// Records skipped because the era field was blank.
    pub skipped_blank_era: usize,
    /// Records skipped because the era field named neither 9 nor 10.
    pub skipped_unrecognized_era: usize,
    /// Records skipped by the minimum age filter.
    pub skipped_under_age: usize,
    /// Records whose code had no translation.
    pub unresolved_records: usize,
}

impl StreamStats {
    /// Returns the percentage of records that were counted.
    pub fn counted_rate(&self) -> f64 {
        if self.records_read == 0 {
            0.0
        } else {
            (self.records_counted as f64 / self.records_read as f64) * 100.0
        }
    }
}
