//! One end-to-end phetable run.

use std::path::PathBuf;

use phetable_types::{DemographicRecord, DiagnosisRecord};
use tracing::info;

use crate::driver::RecordStreamDriver;
use crate::parser::TableParser;
use crate::reference::ReferenceTables;
use crate::types::{OutputConfig, PheResult, PhetableConfig, ReferencePaths, StreamStats};
use crate::writer::{OutputSink, PhetableWriter};

/// Input files of a run.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    /// Diagnosis stream (plain or `.gz`).
    pub diagnosis: PathBuf,
    /// Optional demographics table.
    pub demographics: Option<PathBuf>,
    /// Reference tables.
    pub reference: ReferencePaths,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Subjects registered from the demographics table.
    pub demographic_subjects: usize,
    /// Subject rows in the classification table.
    pub subjects: usize,
    /// Phecode columns in the classification table.
    pub columns: usize,
    /// Distinct unresolved `(era, code)` pairs.
    pub missing_codes: usize,
    /// Diagnosis stream statistics.
    pub stats: StreamStats,
    /// Path of the classification table.
    pub phetable_path: PathBuf,
    /// Path of the unresolved code report.
    pub missing_report_path: PathBuf,
}

/// Runs the whole pipeline: load the reference tables, register the
/// demographics, stream the diagnoses and write both output files.
pub fn run(inputs: &RunInputs, config: &PhetableConfig, output: &OutputConfig) -> PheResult<RunSummary> {
    config.validate()?;

    let tables = ReferenceTables::load(&inputs.reference)?;
    let mut driver = RecordStreamDriver::new(&tables, config);

    let demographic_subjects = match inputs.demographics {
        Some(ref path) => {
            info!("Loading demographics from {}", path.display());
            let parser =
                TableParser::<_, DemographicRecord>::from_path(path, &config.demographic_columns)?;
            let count = driver.load_demographics(parser)?;
            info!("Registered {} subjects from demographics", count);
            count
        }
        None => 0,
    };

    info!("Streaming diagnoses from {}", inputs.diagnosis.display());
    let parser =
        TableParser::<_, DiagnosisRecord>::from_path(&inputs.diagnosis, &config.diagnosis_columns)?;
    driver.consume(parser)?;
    driver.log_summary();

    let columns = driver.retained_columns().len();
    info!("Retained {} of {} phecodes", columns, tables.vocabulary().len());

    let missing_report_path = output.missing_report_path();
    let mut sink = OutputSink::create(&missing_report_path, false)?;
    let missing_codes = driver.write_missing_report(&mut sink)?;
    sink.finish()?;
    info!(
        "Wrote {} unresolved codes to {}",
        missing_codes,
        missing_report_path.display()
    );

    let phetable_path = output.phetable_path();
    let mut writer = PhetableWriter::new(OutputSink::create(&phetable_path, output.compress)?);
    let stats = driver.stats().clone();
    let subjects = driver.write_phetable(&mut writer)?;
    writer.into_inner()?.finish()?;
    info!(
        "Wrote {} subjects x {} phecodes to {}",
        subjects,
        columns,
        phetable_path.display()
    );

    Ok(RunSummary {
        demographic_subjects,
        subjects,
        columns,
        missing_codes,
        stats,
        phetable_path,
        missing_report_path,
    })
}
