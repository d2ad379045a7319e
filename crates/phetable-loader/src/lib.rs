//! # phetable-loader
//!
//! Streaming engine that turns a longitudinal ICD diagnosis table into a
//! subject by phecode case/control table.
//!
//! ## Overview
//!
//! 1. The reference tables (ICD to phecode translation, phecode rollups and
//!    optional gender restrictions) are loaded once into a read-only
//!    [`ReferenceTables`].
//! 2. The diagnosis table is streamed record by record through a
//!    [`RecordStreamDriver`], which keeps only sparse per-subject counts.
//! 3. Every subject is classified with a [`Classifier`] and written by a
//!    [`PhetableWriter`].
//!
//! Reference and diagnosis tables may be gzip compressed (`.gz`).
//!
//! ## Features
//!
//! - `parallel` (default): classifies subjects in batches on the rayon
//!   thread pool. Output is byte-identical with or without it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use phetable_loader::{run, OutputConfig, PhetableConfig, ReferencePaths, RunInputs};
//!
//! let inputs = RunInputs {
//!     diagnosis: "icd_codes.csv.gz".into(),
//!     demographics: Some("demographics.csv".into()),
//!     reference: ReferencePaths {
//!         translation: "data/phecode_map.csv".into(),
//!         rollup: "data/phecode_rollup_map.csv".into(),
//!         restrictions: None,
//!     },
//! };
//!
//! let summary = run(&inputs, &PhetableConfig::default(), &OutputConfig::default())?;
//! println!("{} subjects x {} phecodes", summary.subjects, summary.columns);
//! # Ok::<(), phetable_loader::PheError>(())
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod demographics;
pub mod diagnosis;
pub mod driver;
pub mod graph;
pub mod loader;
pub mod observation;
pub mod parser;
pub mod pipeline;
pub mod reference;
pub mod restriction;
pub mod rollup;
pub mod subject;
pub mod translation;
pub mod types;
pub mod vocabulary;
pub mod writer;

pub use classifier::Classifier;
pub use driver::RecordStreamDriver;
pub use graph::RollupGraph;
pub use loader::{is_gzip_path, open_input};
pub use observation::ObservationLog;
pub use parser::{HeaderIndex, TableParser, TableRecord};
pub use pipeline::{run, RunInputs, RunSummary};
pub use reference::ReferenceTables;
pub use restriction::GenderRestrictions;
pub use subject::SubjectAccumulator;
pub use types::{
    DemographicColumns, DiagnosisColumns, OutputConfig, PheError, PheResult, PhetableConfig,
    ReferencePaths, StreamStats,
};
pub use vocabulary::{VocabularyBuilder, VocabularyIndex};
pub use writer::{missing_code_key, write_missing_report, MissingCode, OutputSink, PhetableWriter};

// Re-export phetable-types for convenience
pub use phetable_types;
