//! # phetable-cli
//!
//! Command-line front end for building phecode case/control tables.
//!
//! ```bash
//! phetable -i icd_codes.csv.gz --demo demographics.csv --out cohort
//! ```

#![warn(missing_docs)]

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use phetable_loader::{
    DemographicColumns, DiagnosisColumns, OutputConfig, PhetableConfig, ReferencePaths, RunInputs,
};
use phetable_types::{well_known, SexCoding};

/// Build a subject by phecode case/control table from ICD diagnoses
#[derive(Parser, Debug, Clone)]
#[command(name = "phetable", version)]
#[command(about = "Map ICD-9/ICD-10 diagnoses to phecodes and classify subjects as cases or controls")]
pub struct Cli {
    /// Diagnosis table (CSV, optionally gzipped)
    #[arg(short = 'i', long = "icd-codes")]
    pub icd_codes: PathBuf,

    /// ICD to phecode translation table
    #[arg(short = 't', long = "translation-map", default_value = "data/phecode_map.csv")]
    pub translation_map: PathBuf,

    /// Phecode rollup table
    #[arg(short = 'r', long = "rollup-map", default_value = "data/phecode_rollup_map.csv")]
    pub rollup_map: PathBuf,

    /// Gender restriction table (phecode,male_only,female_only)
    #[arg(long)]
    pub restrictions: Option<PathBuf>,

    /// Minimum number of occurrences for a case call
    #[arg(short = 'm', long = "min-count", default_value_t = well_known::DEFAULT_MIN_COUNT)]
    pub min_count: u32,

    /// Minimum age at diagnosis for a record to count
    #[arg(short = 'a', long = "min-age", default_value_t = well_known::DEFAULT_MIN_AGE)]
    pub min_age: f64,

    /// Demographics table with subject sex
    #[arg(long)]
    pub demo: Option<PathBuf>,

    /// Subject id column of the diagnosis table
    #[arg(long = "id-col", default_value = well_known::DEFAULT_ID_COLUMN)]
    pub id_col: String,

    /// Age column of the diagnosis table
    #[arg(long = "age-col", default_value = well_known::DEFAULT_AGE_COLUMN)]
    pub age_col: String,

    /// ICD code column of the diagnosis table
    #[arg(long = "icd-col", default_value = well_known::DEFAULT_CODE_COLUMN)]
    pub icd_col: String,

    /// ICD era column of the diagnosis table (values containing 9 or 10)
    #[arg(long = "icd-era", default_value = well_known::DEFAULT_ERA_COLUMN)]
    pub icd_era: String,

    /// Sex column of the demographics table
    #[arg(long = "sex-col", default_value = well_known::DEFAULT_SEX_COLUMN)]
    pub sex_col: String,

    /// Subject id column of the demographics table [default: --id-col]
    #[arg(long = "demo-id-col")]
    pub demo_id_col: Option<String>,

    /// Prefix of the output files
    #[arg(long, default_value = well_known::DEFAULT_OUTPUT_PREFIX)]
    pub out: String,

    /// Gzip the classification table
    #[arg(long = "compress-output", action = ArgAction::Set, default_value_t = true)]
    pub compress_output: bool,

    /// Token marking male subjects in the sex column
    #[arg(long = "male-code", default_value = well_known::DEFAULT_MALE_CODE)]
    pub male_code: String,

    /// Token marking female subjects in the sex column
    #[arg(long = "female-code", default_value = well_known::DEFAULT_FEMALE_CODE)]
    pub female_code: String,
}

impl Cli {
    /// Builds the run configuration.
    pub fn config(&self) -> PhetableConfig {
        PhetableConfig {
            min_count: self.min_count,
            min_age: self.min_age,
            sex_coding: SexCoding::new(self.male_code.clone(), self.female_code.clone()),
            diagnosis_columns: DiagnosisColumns {
                id: self.id_col.clone(),
                age: self.age_col.clone(),
                code: self.icd_col.clone(),
                era: self.icd_era.clone(),
            },
            demographic_columns: DemographicColumns {
                id: self.demo_id_col.clone().unwrap_or_else(|| self.id_col.clone()),
                sex: self.sex_col.clone(),
            },
            ..Default::default()
        }
    }

    /// Builds the input file set.
    pub fn inputs(&self) -> RunInputs {
        RunInputs {
            diagnosis: self.icd_codes.clone(),
            demographics: self.demo.clone(),
            reference: ReferencePaths {
                translation: self.translation_map.clone(),
                rollup: self.rollup_map.clone(),
                restrictions: self.restrictions.clone(),
            },
        }
    }

    /// Builds the output settings.
    pub fn output(&self) -> OutputConfig {
        OutputConfig {
            prefix: self.out.clone(),
            compress: self.compress_output,
        }
    }
}
