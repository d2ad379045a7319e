//! Read-only reference tables.
//!
//! Bundles the vocabulary, rollup graph and gender restrictions that are
//! built once before any diagnosis record is read.
//!
//! ```ignore
//! let tables = ReferenceTables::load(&ReferencePaths {
//!     translation: "data/phecode_map.csv".into(),
//!     rollup: "data/phecode_rollup_map.csv".into(),
//!     restrictions: None,
//! })?;
//!
//! let index = tables.vocabulary().resolve("E11.9", IcdEra::Icd10)?;
//! ```

use std::path::Path;

use phetable_types::{RestrictionRow, RollupRow, TranslationRow};
use tracing::{debug, info};

use crate::graph::RollupGraph;
use crate::observation::{self, ObservationLog};
use crate::parser::TableParser;
use crate::restriction::GenderRestrictions;
use crate::types::{PheResult, ReferencePaths};
use crate::vocabulary::{VocabularyBuilder, VocabularyIndex};

/// Vocabulary, rollup graph and gender restrictions for one run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    vocabulary: VocabularyIndex,
    graph: RollupGraph,
    restrictions: GenderRestrictions,
}

impl ReferenceTables {
    /// Loads all reference tables from disk.
    pub fn load(paths: &ReferencePaths) -> PheResult<Self> {
        let mut observations = ObservationLog::new();

        info!("Loading translation table from {}", paths.translation.display());
        let vocabulary = load_vocabulary(&paths.translation, &mut observations)?;
        info!(
            "Loaded {} phecodes from {} ICD-9 and {} ICD-10 codes",
            vocabulary.len(),
            vocabulary.icd9_count(),
            vocabulary.icd10_count()
        );

        info!("Loading rollup table from {}", paths.rollup.display());
        let graph = load_rollups(&paths.rollup, &vocabulary)?;
        info!("Loaded {} rollup relationships", graph.edge_count());

        let restrictions = match paths.restrictions {
            Some(ref path) => {
                info!("Loading gender restrictions from {}", path.display());
                let restrictions = load_restrictions(path)?;
                info!(
                    "Loaded {} female-only and {} male-only phecodes",
                    restrictions.female_only_count(),
                    restrictions.male_only_count()
                );
                restrictions
            }
            None => GenderRestrictions::new(),
        };

        Ok(Self::from_parts(vocabulary, graph, restrictions))
    }

    /// Assembles tables built elsewhere.
    pub fn from_parts(
        vocabulary: VocabularyIndex,
        graph: RollupGraph,
        restrictions: GenderRestrictions,
    ) -> Self {
        Self {
            vocabulary,
            graph,
            restrictions,
        }
    }

    /// Returns the vocabulary.
    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    /// Returns the rollup graph.
    pub fn graph(&self) -> &RollupGraph {
        &self.graph
    }

    /// Returns the gender restrictions.
    pub fn restrictions(&self) -> &GenderRestrictions {
        &self.restrictions
    }
}

/// Loads and finalizes the vocabulary from a translation table file.
pub fn load_vocabulary<P: AsRef<Path>>(
    path: P,
    observations: &mut ObservationLog,
) -> PheResult<VocabularyIndex> {
    let parser = TableParser::<_, TranslationRow>::from_path(path, &())?;
    build_vocabulary(parser, observations)
}

/// Builds the vocabulary from translation rows.
///
/// Rows without an era token are dropped; the first one is logged.
pub fn build_vocabulary<I>(rows: I, observations: &mut ObservationLog) -> PheResult<VocabularyIndex>
where
    I: IntoIterator<Item = PheResult<TranslationRow>>,
{
    let mut builder = VocabularyBuilder::new();
    let mut dropped = 0usize;

    for row in rows {
        let row = row?;
        if builder.add_row(&row) {
            continue;
        }
        dropped += 1;
        if row.has_phecode() {
            observations.note(observation::UNRECOGNIZED_TRANSLATION_ERA, || {
                format!(
                    "Unrecognized era '{}' for code '{}'; rows without ICD-9/ICD-10 era are dropped",
                    row.vocabulary_id, row.code
                )
            });
        }
    }

    if dropped > 0 {
        debug!("Dropped {} translation rows", dropped);
    }
    builder.finalize()
}

/// Loads the rollup graph from a rollup table file.
pub fn load_rollups<P: AsRef<Path>>(path: P, vocabulary: &VocabularyIndex) -> PheResult<RollupGraph> {
    let parser = TableParser::<_, RollupRow>::from_path(path, &())?;
    build_rollups(parser, vocabulary)
}

/// Builds the rollup graph from rollup rows.
///
/// # Errors
/// Fails on the first phecode missing from the vocabulary.
pub fn build_rollups<I>(rows: I, vocabulary: &VocabularyIndex) -> PheResult<RollupGraph>
where
    I: IntoIterator<Item = PheResult<RollupRow>>,
{
    let mut graph = RollupGraph::new();
    for row in rows {
        let row = row?;
        graph.add_relationship(vocabulary, &row.parent, &row.child)?;
    }
    Ok(graph)
}

/// Loads gender restrictions from a restriction table file.
pub fn load_restrictions<P: AsRef<Path>>(path: P) -> PheResult<GenderRestrictions> {
    let parser = TableParser::<_, RestrictionRow>::from_path(path, &())?;
    build_restrictions(parser)
}

/// Builds gender restrictions from restriction rows.
pub fn build_restrictions<I>(rows: I) -> PheResult<GenderRestrictions>
where
    I: IntoIterator<Item = PheResult<RestrictionRow>>,
{
    let mut restrictions = GenderRestrictions::new();
    for row in rows {
        restrictions.add(&row?);
    }
    Ok(restrictions)
}
