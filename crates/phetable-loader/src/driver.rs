//! Diagnosis stream driver.
//!
//! Consumes diagnosis records one at a time, resolving each to a phecode
//! index and updating the subject's sparse counts. Only the per-subject
//! counts, the observed-phecode set and the unresolved code tally are kept
//! in memory, never the records themselves.
//!
//! After the stream is exhausted, [`RecordStreamDriver::write_phetable`]
//! classifies every subject (sorted by id) for the retained phecodes.

use std::collections::BTreeMap;
use std::io::Write;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use phetable_types::{
    well_known, Classification, DemographicRecord, DiagnosisRecord, IcdEra, PheIndex, Sex,
};
use tracing::info;

use crate::classifier::Classifier;
use crate::observation::{self, ObservationLog};
use crate::parser::parse;
use crate::reference::ReferenceTables;
use crate::subject::SubjectAccumulator;
use crate::types::{PheResult, PhetableConfig, StreamStats};
use crate::writer::{self, MissingCode, PhetableWriter};

/// Streams diagnosis records into per-subject accumulators.
#[derive(Debug)]
pub struct RecordStreamDriver<'a> {
    tables: &'a ReferenceTables,
    config: &'a PhetableConfig,
    subjects: BTreeMap<String, SubjectAccumulator>,
    observed: Vec<bool>,
    missing_codes: BTreeMap<MissingCode, u64>,
    observations: ObservationLog,
    stats: StreamStats,
}

impl<'a> RecordStreamDriver<'a> {
    /// Creates a driver over finalized reference tables.
    pub fn new(tables: &'a ReferenceTables, config: &'a PhetableConfig) -> Self {
        Self {
            tables,
            config,
            subjects: BTreeMap::new(),
            observed: vec![false; tables.vocabulary().len()],
            missing_codes: BTreeMap::new(),
            observations: ObservationLog::new(),
            stats: StreamStats::default(),
        }
    }

    /// Registers a subject from the demographics table.
    ///
    /// Registered subjects are emitted even without diagnosis records.
    pub fn register_subject(&mut self, record: &DemographicRecord) {
        let sex = self.config.sex_coding.decode(&record.sex);
        if sex == Sex::Unrecognized {
            let coding = &self.config.sex_coding;
            self.observations.note(observation::UNRECOGNIZED_SEX, || {
                format!(
                    "Unrecognized sex '{}'. Should be {}/{}; gender restrictions are not applied to such subjects",
                    record.sex, coding.male, coding.female
                )
            });
        }
        self.subjects
            .entry(record.subject_id.clone())
            .or_default()
            .set_sex(sex);
    }

    /// Registers every subject of a demographics table.
    ///
    /// Returns the number of records read.
    pub fn load_demographics<I>(&mut self, records: I) -> PheResult<usize>
    where
        I: IntoIterator<Item = PheResult<DemographicRecord>>,
    {
        let mut count = 0;
        for record in records {
            self.register_subject(&record?);
            count += 1;
        }
        Ok(count)
    }

    /// Processes one diagnosis record.
    ///
    /// Per-record problems (blank or unknown era, bad age, unmapped code)
    /// are tallied or logged once and never fail the stream.
    pub fn process(&mut self, record: &DiagnosisRecord) {
        self.stats.records_read += 1;

        if !self.subjects.contains_key(&record.subject_id) {
            self.subjects
                .insert(record.subject_id.clone(), SubjectAccumulator::new());
        }

        let age = self.record_age(record.age.as_deref());

        if record.has_blank_era() {
            self.stats.skipped_blank_era += 1;
            return;
        }

        let Some(era) = IcdEra::search(&record.era_flag) else {
            self.observations
                .note(observation::UNRECOGNIZED_DIAGNOSIS_ERA, || {
                    format!(
                        "Unrecognized era flag '{}'; records without ICD-9/ICD-10 era are skipped",
                        record.era_flag
                    )
                });
            self.stats.skipped_unrecognized_era += 1;
            return;
        };

        if age < self.config.min_age {
            self.stats.skipped_under_age += 1;
            return;
        }

        match self.tables.vocabulary().resolve(&record.code, era) {
            Ok(index) => {
                self.observed[index] = true;
                if let Some(subject) = self.subjects.get_mut(&record.subject_id) {
                    subject.record(index);
                }
                self.stats.records_counted += 1;
            }
            Err(_) => {
                *self
                    .missing_codes
                    .entry((era, record.code.clone()))
                    .or_insert(0) += 1;
                self.stats.unresolved_records += 1;
            }
        }
    }

    /// Processes a whole diagnosis stream, logging progress.
    ///
    /// Stops at the first read error (I/O or CSV framing). Returns the
    /// number of records processed.
    pub fn consume<I>(&mut self, records: I) -> PheResult<usize>
    where
        I: IntoIterator<Item = PheResult<DiagnosisRecord>>,
    {
        let interval = self.config.progress_interval.max(1);
        let mut count = 0;

        for record in records {
            self.process(&record?);
            count += 1;
            if count % interval == 0 {
                info!("-> {} records, {} subjects", count, self.subjects.len());
            }
        }

        Ok(count)
    }

    fn record_age(&mut self, raw: Option<&str>) -> f64 {
        let Some(raw) = raw else {
            let column = &self.config.diagnosis_columns.age;
            self.observations.note(observation::MISSING_AGE_COLUMN, || {
                format!(
                    "Age column '{}' not found in header. Setting age to {}",
                    column,
                    well_known::MISSING_AGE_COLUMN_AGE
                )
            });
            return well_known::MISSING_AGE_COLUMN_AGE;
        };

        match parse::age(raw) {
            Some(age) => age,
            None => {
                self.observations.note(observation::INVALID_AGE, || {
                    format!(
                        "Age value '{}' is invalid. Setting it to {}",
                        raw,
                        well_known::INVALID_AGE
                    )
                });
                well_known::INVALID_AGE
            }
        }
    }

    /// Returns true if a record resolved to this phecode.
    pub fn is_observed(&self, index: PheIndex) -> bool {
        self.observed.get(index).copied().unwrap_or(false)
    }

    /// Returns the phecodes that become output columns, in vocabulary order.
    ///
    /// A phecode is retained if it was observed, or if one of its direct
    /// rollup parents or children was.
    pub fn retained_columns(&self) -> Vec<PheIndex> {
        let graph = self.tables.graph();
        (0..self.observed.len())
            .filter(|&index| {
                self.observed[index]
                    || graph.children_of(index).iter().any(|&c| self.is_observed(c))
                    || graph.parents_of(index).iter().any(|&p| self.is_observed(p))
            })
            .collect()
    }

    /// Gets a subject's accumulator.
    pub fn subject(&self, subject_id: &str) -> Option<&SubjectAccumulator> {
        self.subjects.get(subject_id)
    }

    /// Returns the number of subjects seen.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Returns the unresolved `(era, code)` tally.
    pub fn missing_codes(&self) -> &BTreeMap<MissingCode, u64> {
        &self.missing_codes
    }

    /// Returns the stream statistics.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Classifies every subject and writes the classification table.
    ///
    /// Subject accumulators are consumed. Rows are written in subject id
    /// order; with the `parallel` feature each batch is classified on the
    /// rayon pool first. Returns the number of subject rows written.
    pub fn write_phetable<W: Write>(&mut self, out: &mut PhetableWriter<W>) -> PheResult<usize> {
        let tables = self.tables;
        let columns = self.retained_columns();
        let header: Vec<&str> = columns
            .iter()
            .filter_map(|&index| tables.vocabulary().phecode(index))
            .collect();
        out.write_header(&self.config.diagnosis_columns.id, &header)?;

        let classifier = Classifier::new(tables, self.config.min_count);
        let subjects: Vec<(String, SubjectAccumulator)> =
            std::mem::take(&mut self.subjects).into_iter().collect();

        for batch in subjects.chunks(self.config.batch_size.max(1)) {
            let rows = classify_batch(&classifier, batch, &columns);
            for ((subject_id, _), row) in batch.iter().zip(rows) {
                out.write_row(subject_id, &row)?;
            }
        }

        Ok(subjects.len())
    }

    /// Writes the unresolved code report.
    pub fn write_missing_report<W: Write>(&self, out: W) -> PheResult<usize> {
        writer::write_missing_report(out, &self.missing_codes)
    }

    /// Logs a summary of the stream.
    pub fn log_summary(&self) {
        let stats = &self.stats;
        info!(
            "Read {} records ({:.1}% counted): {} blank era, {} unrecognized era, {} under age {}, {} unresolved",
            stats.records_read,
            stats.counted_rate(),
            stats.skipped_blank_era,
            stats.skipped_unrecognized_era,
            stats.skipped_under_age,
            self.config.min_age,
            stats.unresolved_records
        );
        info!(
            "{} subjects, {} distinct unresolved codes",
            self.subjects.len(),
            self.missing_codes.len()
        );
    }
}

/// Batches smaller than this are classified on the calling thread.
#[cfg(feature = "parallel")]
const MIN_PARALLEL_BATCH: usize = 64;

#[cfg(feature = "parallel")]
fn classify_batch(
    classifier: &Classifier<'_>,
    batch: &[(String, SubjectAccumulator)],
    columns: &[PheIndex],
) -> Vec<Vec<Classification>> {
    if batch.len() < MIN_PARALLEL_BATCH {
        return classify_sequential(classifier, batch, columns);
    }
    batch
        .par_iter()
        .map(|(_, subject)| classifier.classify_row(subject, columns))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn classify_batch(
    classifier: &Classifier<'_>,
    batch: &[(String, SubjectAccumulator)],
    columns: &[PheIndex],
) -> Vec<Vec<Classification>> {
    classify_sequential(classifier, batch, columns)
}

fn classify_sequential(
    classifier: &Classifier<'_>,
    batch: &[(String, SubjectAccumulator)],
    columns: &[PheIndex],
) -> Vec<Vec<Classification>> {
    batch
        .iter()
        .map(|(_, subject)| classifier.classify_row(subject, columns))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis;
    use crate::graph::RollupGraph;
    use crate::parser::TableParser;
    use crate::restriction::GenderRestrictions;
    use crate::types::DiagnosisColumns;
    use crate::vocabulary::VocabularyBuilder;
    use std::io::Cursor;

    fn make_tables(rollups: &[(&str, &str)]) -> ReferenceTables {
        let mut builder = VocabularyBuilder::new();
        builder.add_code("E11.9", "ICD10CM", "250.2");
        builder.add_code("250.00", "ICD9CM", "250.2");
        builder.add_code("E10.9", "ICD10CM", "250.1");
        builder.add_code("E13", "ICD10CM", "250");
        builder.add_code("I10", "ICD10CM", "401.1");
        builder.add_code("N94.6", "ICD10CM", "626.1");
        let vocabulary = builder.finalize().unwrap();

        let mut graph = RollupGraph::new();
        for (parent, child) in rollups {
            graph.add_relationship(&vocabulary, parent, child).unwrap();
        }
        let mut restrictions = GenderRestrictions::new();
        restrictions.add_female_only("626.1");
        ReferenceTables::from_parts(vocabulary, graph, restrictions)
    }

    fn make_record(subject_id: &str, age: Option<&str>, code: &str, era: &str) -> DiagnosisRecord {
        DiagnosisRecord {
            subject_id: subject_id.to_string(),
            age: age.map(str::to_string),
            code: code.to_string(),
            era_flag: era.to_string(),
        }
    }

    fn render(driver: &mut RecordStreamDriver<'_>) -> String {
        let mut out = PhetableWriter::new(Vec::new());
        driver.write_phetable(&mut out).unwrap();
        String::from_utf8(out.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let mut builder = VocabularyBuilder::new();
        builder.add_code("E11.9", "10", "250.2");
        let tables = ReferenceTables::from_parts(
            builder.finalize().unwrap(),
            RollupGraph::new(),
            GenderRestrictions::new(),
        );
        let config = PhetableConfig {
            diagnosis_columns: DiagnosisColumns {
                id: "ID".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let stream = "ID,AGE_AT_ICD,ICD_CODE,ICD_FLAG\n\
                      A1,40,E11.9,10\n\
                      A1,45,E11.9,10\n\
                      A2,10,E11.9,10\n";
        let parser = TableParser::<_, DiagnosisRecord>::from_reader(
            Cursor::new(stream),
            &config.diagnosis_columns,
        )
        .unwrap();

        let mut driver = RecordStreamDriver::new(&tables, &config);
        assert_eq!(driver.consume(parser).unwrap(), 3);
        assert_eq!(driver.stats().skipped_under_age, 1);

        assert_eq!(render(&mut driver), "ID,250.2\nA1,TRUE\nA2,FALSE\n");
    }

    #[test]
    fn test_blank_and_unknown_era_skipped() {
        let tables = make_tables(&[]);
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);

        driver.process(&make_record("A1", Some("40"), "E11.9", ""));
        driver.process(&make_record("A1", Some("40"), "E11.9", "READ"));

        let stats = driver.stats();
        assert_eq!(stats.records_read, 2);
        assert_eq!(stats.skipped_blank_era, 1);
        assert_eq!(stats.skipped_unrecognized_era, 1);
        assert_eq!(stats.records_counted, 0);
        // The subject still exists
        assert!(driver.subject("A1").unwrap().is_empty());
    }

    #[test]
    fn test_age_handling() {
        let tables = make_tables(&[]);
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);
        let diabetes = tables.vocabulary().lookup("250.2").unwrap();

        // Invalid age counts as 0 and falls under the minimum
        driver.process(&make_record("A1", Some("unknown"), "E11.9", "10"));
        // Missing age column counts as 100
        driver.process(&make_record("A1", None, "E11.9", "10"));
        driver.process(&make_record("A1", Some("18"), "E11.9", "10"));

        assert_eq!(driver.subject("A1").unwrap().count_for(diabetes), 2);
        assert_eq!(driver.stats().skipped_under_age, 1);
        assert!(driver.observations.has_noted(observation::INVALID_AGE));
        assert!(driver.observations.has_noted(observation::MISSING_AGE_COLUMN));
    }

    #[test]
    fn test_missing_codes_tallied() {
        let tables = make_tables(&[]);
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);

        driver.process(&make_record("A1", Some("40"), "Z99.9", "10"));
        driver.process(&make_record("A2", Some("40"), "Z99.9", "ICD10CM"));
        driver.process(&make_record("A2", Some("40"), "E11.9", "9"));
        driver.process(&make_record("A2", Some("40"), "I10", "10"));
        driver.process(&make_record("A2", Some("40"), "I10", "10"));

        let missing = driver.missing_codes();
        assert_eq!(missing.get(&(IcdEra::Icd10, "Z99.9".to_string())), Some(&2));
        assert_eq!(missing.get(&(IcdEra::Icd9, "E11.9".to_string())), Some(&1));
        assert_eq!(driver.stats().unresolved_records, 3);

        let mut report = Vec::new();
        driver.write_missing_report(&mut report).unwrap();
        assert_eq!(
            String::from_utf8(report).unwrap(),
            "ICD Code\tCount\n\"10\tZ99.9\"\t2\n\"9\tE11.9\"\t1\n"
        );

        // Unresolved codes do not disturb other classifications
        assert_eq!(render(&mut driver), "id,401.1\nA1,FALSE\nA2,TRUE\n");
    }

    #[test]
    fn test_retained_columns_follow_rollups() {
        let tables = make_tables(&[("250", "250.1"), ("250", "250.2")]);
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);

        driver.process(&make_record("A1", Some("40"), "E11.9", "10"));

        let retained: Vec<&str> = driver
            .retained_columns()
            .into_iter()
            .filter_map(|i| tables.vocabulary().phecode(i))
            .collect();
        // 250.2 observed, 250 is its parent; 250.1 is only a sibling
        assert_eq!(retained, vec!["250", "250.2"]);
        assert!(driver.is_observed(tables.vocabulary().lookup("250.2").unwrap()));
        assert!(!driver.is_observed(tables.vocabulary().lookup("250").unwrap()));
    }

    #[test]
    fn test_rollup_classification_in_output() {
        let tables = make_tables(&[("250", "250.1"), ("250", "250.2")]);
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);

        // A1: two type 2 codes (one ICD-9, one ICD-10), one hypertension code
        driver.process(&make_record("A1", Some("40"), "E11.9", "10"));
        driver.process(&make_record("A1", Some("41"), "250.00", "9"));
        driver.process(&make_record("A1", Some("42"), "I10", "10"));
        // A2: two hypertension codes only
        driver.process(&make_record("A2", Some("50"), "I10", "10"));
        driver.process(&make_record("A2", Some("51"), "I10", "10"));
        // A3: one type 1 code, one unspecified diabetes code
        driver.process(&make_record("A3", Some("60"), "E10.9", "10"));
        driver.process(&make_record("A3", Some("60"), "E13", "10"));

        assert_eq!(
            render(&mut driver),
            "id,250,250.1,250.2,401.1\n\
             A1,TRUE,NA,TRUE,NA\n\
             A2,FALSE,FALSE,FALSE,TRUE\n\
             A3,TRUE,NA,NA,NA\n"
        );
    }

    #[test]
    fn test_demographics_and_restrictions() {
        let tables = make_tables(&[]);
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);

        let demographics = "id,SEX\nF1,F\nM1,M\nU1,X\nD1,F\n";
        let parser = TableParser::<_, DemographicRecord>::from_reader(
            Cursor::new(demographics),
            &config.demographic_columns,
        )
        .unwrap();
        assert_eq!(driver.load_demographics(parser).unwrap(), 4);
        assert!(driver.observations.has_noted(observation::UNRECOGNIZED_SEX));

        for subject in ["F1", "M1", "U1"] {
            driver.process(&make_record(subject, Some("30"), "N94.6", "10"));
            driver.process(&make_record(subject, Some("31"), "N94.6", "10"));
        }

        assert_eq!(
            render(&mut driver),
            "id,626.1\nD1,FALSE\nF1,TRUE\nM1,NA\nU1,TRUE\n"
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let tables = make_tables(&[("250", "250.2")]);
        let config = PhetableConfig {
            batch_size: 2,
            ..Default::default()
        };
        let records = [
            make_record("B7", Some("40"), "E11.9", "10"),
            make_record("A1", Some("40"), "I10", "10"),
            make_record("C3", Some("40"), "E13", "10"),
            make_record("A10", Some("40"), "E11.9", "10"),
            make_record("B7", Some("40"), "E11.9", "10"),
        ];

        let run = || {
            let mut driver = RecordStreamDriver::new(&tables, &config);
            for record in &records {
                driver.process(record);
            }
            render(&mut driver)
        };

        let first = run();
        assert_eq!(first, run());
        let ids: Vec<&str> = first
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["A1", "A10", "B7", "C3"]);
    }

    #[test]
    fn test_batched_classification_matches_single_batch() {
        let tables = make_tables(&[("250", "250.1"), ("250", "250.2")]);
        let records: Vec<DiagnosisRecord> = (0..25)
            .map(|i| {
                let code = ["E11.9", "E10.9", "I10", "E13", "Z00"][i % 5];
                make_record(&format!("S{:02}", i % 7), Some("40"), code, "10")
            })
            .collect();

        let render_with = |batch_size: usize| {
            let config = PhetableConfig {
                batch_size,
                ..Default::default()
            };
            let mut driver = RecordStreamDriver::new(&tables, &config);
            for record in &records {
                driver.process(record);
            }
            render(&mut driver)
        };

        assert_eq!(render_with(1), render_with(100));
    }

    #[test]
    fn test_batch_paths_match_per_subject_rows() {
        let tables = make_tables(&[("250", "250.1"), ("250", "250.2")]);
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);
        // Enough subjects to take the threaded path when it is compiled in
        for i in 0..200 {
            let code = ["E11.9", "E10.9", "I10", "E13", "N94.6"][i % 5];
            driver.process(&make_record(&format!("S{:03}", i), Some("40"), code, "10"));
            if i % 3 == 0 {
                driver.process(&make_record(&format!("S{:03}", i), Some("41"), code, "10"));
            }
        }

        let columns = driver.retained_columns();
        let classifier = Classifier::new(&tables, config.min_count);
        let subjects: Vec<(String, SubjectAccumulator)> =
            std::mem::take(&mut driver.subjects).into_iter().collect();
        let expected: Vec<Vec<Classification>> = subjects
            .iter()
            .map(|(_, subject)| classifier.classify_row(subject, &columns))
            .collect();

        assert_eq!(classify_sequential(&classifier, &subjects, &columns), expected);
        assert_eq!(classify_batch(&classifier, &subjects, &columns), expected);
        assert_eq!(classify_batch(&classifier, &subjects[..3], &columns), expected[..3]);
    }

    #[test]
    fn test_retained_columns_tolerate_out_of_range_edges() {
        let tables = make_tables(&[]);
        let mut graph = RollupGraph::new();
        graph.add_edge(0, 99);
        let tables = ReferenceTables::from_parts(
            tables.vocabulary().clone(),
            graph,
            GenderRestrictions::new(),
        );
        let config = PhetableConfig::default();
        let mut driver = RecordStreamDriver::new(&tables, &config);
        driver.process(&make_record("A1", Some("40"), "I10", "10"));

        let retained = driver.retained_columns();
        assert_eq!(retained, vec![tables.vocabulary().lookup("401.1").unwrap()]);
    }

    #[test]
    fn test_diagnosis_columns_bind_to_parser() {
        // Column order in the file does not matter
        let stream = "ICD_FLAG,ICD_CODE,id,AGE_AT_ICD\n10,E11.9,A1,40\n";
        let parser = TableParser::<_, DiagnosisRecord>::from_reader(
            Cursor::new(stream),
            &DiagnosisColumns::default(),
        )
        .unwrap();
        let positions: &diagnosis::DiagnosisPositions = parser.columns();
        assert!(positions.has_age());
    }
}
