//! Output writers.
//!
//! The classification table is comma-delimited, optionally gzipped. The
//! unresolved code report is tab-delimited and always plain.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use csv::{Writer, WriterBuilder};
use flate2::write::GzEncoder;
use flate2::Compression;
use phetable_types::{Classification, IcdEra};

use crate::types::{PheError, PheResult};

/// An `(era, raw code)` pair that failed resolution.
pub type MissingCode = (IcdEra, String);

/// Output file, plain or gzip-compressed.
pub enum OutputSink {
    /// Uncompressed file.
    Plain(BufWriter<File>),
    /// Gzip-compressed file.
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputSink {
    /// Creates (truncating) an output file.
    pub fn create<P: AsRef<Path>>(path: P, compress: bool) -> PheResult<Self> {
        let file = BufWriter::new(File::create(path)?);
        if compress {
            Ok(Self::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Self::Plain(file))
        }
    }

    /// Flushes buffered data and writes the gzip trailer if compressed.
    pub fn finish(self) -> PheResult<()> {
        let mut file = match self {
            Self::Plain(file) => file,
            Self::Gzip(encoder) => encoder.finish()?,
        };
        file.flush()?;
        Ok(())
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(file) => file.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(file) => file.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Writes the classification table.
pub struct PhetableWriter<W: Write> {
    writer: Writer<W>,
    rows_written: usize,
}

impl<W: Write> PhetableWriter<W> {
    /// Wraps an output stream.
    pub fn new(inner: W) -> Self {
        Self {
            writer: WriterBuilder::new()
                .delimiter(b',')
                .quote(b'"')
                .from_writer(inner),
            rows_written: 0,
        }
    }

    /// Writes the header: the id column name followed by the phecodes.
    pub fn write_header<S: AsRef<str>>(&mut self, id_column: &str, phecodes: &[S]) -> PheResult<()> {
        self.writer.write_field(id_column)?;
        for phecode in phecodes {
            self.writer.write_field(phecode.as_ref())?;
        }
        self.writer.write_record(None::<&[u8]>)?;
        Ok(())
    }

    /// Writes one subject row.
    pub fn write_row(&mut self, subject_id: &str, row: &[Classification]) -> PheResult<()> {
        self.writer.write_field(subject_id)?;
        for classification in row {
            self.writer.write_field(classification.as_str())?;
        }
        self.writer.write_record(None::<&[u8]>)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Returns the number of subject rows written.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes and returns the underlying stream.
    pub fn into_inner(self) -> PheResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| PheError::Io(e.into_error()))
    }
}

/// Formats the report key of an unresolved code: era and code joined by a tab.
pub fn missing_code_key((era, code): &MissingCode) -> String {
    format!("{}\t{}", era, code)
}

/// Writes the unresolved code report.
///
/// Two tab-separated columns, `ICD Code` and `Count`. The key holds the era
/// and the raw code joined by a tab, so it is written quoted. Rows are sorted
/// by key string, which puts ICD-10 keys before ICD-9 ones.
///
/// Returns the number of rows written.
pub fn write_missing_report<W: Write>(
    inner: W,
    missing: &BTreeMap<MissingCode, u64>,
) -> PheResult<usize> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote(b'"')
        .from_writer(inner);

    let mut rows: Vec<(String, u64)> = missing
        .iter()
        .map(|(missing_code, &count)| (missing_code_key(missing_code), count))
        .collect();
    rows.sort_unstable();

    writer.write_record(["ICD Code", "Count"])?;
    for (key, count) in &rows {
        writer.write_record([key.as_str(), count.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_phetable_writer() {
        let mut writer = PhetableWriter::new(Vec::new());
        writer.write_header("GRID", &["250.2", "401.1"]).unwrap();
        writer
            .write_row("R100", &[Classification::Case, Classification::NotApplicable])
            .unwrap();
        writer
            .write_row("R200", &[Classification::Control, Classification::Control])
            .unwrap();
        assert_eq!(writer.rows_written(), 2);

        let bytes = writer.into_inner().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "GRID,250.2,401.1\nR100,TRUE,NA\nR200,FALSE,FALSE\n"
        );
    }

    #[test]
    fn test_header_without_phecodes() {
        let mut writer = PhetableWriter::new(Vec::new());
        writer.write_header::<&str>("id", &[]).unwrap();
        writer.write_row("A1", &[]).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "id\nA1\n");
    }

    #[test]
    fn test_missing_report() {
        let mut missing = BTreeMap::new();
        missing.insert((IcdEra::Icd10, "Z99.9".to_string()), 4);
        missing.insert((IcdEra::Icd9, "V99".to_string()), 1);
        missing.insert((IcdEra::Icd10, "A00".to_string()), 2);

        let mut out = Vec::new();
        assert_eq!(write_missing_report(&mut out, &missing).unwrap(), 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ICD Code\tCount\n\"10\tA00\"\t2\n\"10\tZ99.9\"\t4\n\"9\tV99\"\t1\n"
        );
    }

    #[test]
    fn test_missing_report_has_two_columns() {
        let mut missing = BTreeMap::new();
        missing.insert((IcdEra::Icd9, "V99".to_string()), 1);
        missing.insert((IcdEra::Icd10, "A00".to_string()), 2);

        let mut out = Vec::new();
        write_missing_report(&mut out, &missing).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(out.as_slice());
        assert_eq!(reader.headers().unwrap(), vec!["ICD Code", "Count"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == 2));
        assert_eq!(&rows[0][0], "10\tA00");
        assert_eq!(&rows[1][0], "9\tV99");
        assert_eq!(&rows[1][1], "1");
    }

    #[test]
    fn test_missing_code_key() {
        assert_eq!(
            missing_code_key(&(IcdEra::Icd10, "E11.9".to_string())),
            "10\tE11.9"
        );
    }

    #[test]
    fn test_gzip_sink_matches_plain() {
        let dir = tempfile::tempdir().unwrap();
        let plain_path = dir.path().join("out.txt");
        let gz_path = dir.path().join("out.txt.gz");

        for (path, compress) in [(&plain_path, false), (&gz_path, true)] {
            let mut writer = PhetableWriter::new(OutputSink::create(path, compress).unwrap());
            writer.write_header("id", &["250.2"]).unwrap();
            writer.write_row("A1", &[Classification::Case]).unwrap();
            writer.into_inner().unwrap().finish().unwrap();
        }

        let plain = std::fs::read_to_string(&plain_path).unwrap();
        let mut unzipped = String::new();
        GzDecoder::new(File::open(&gz_path).unwrap())
            .read_to_string(&mut unzipped)
            .unwrap();

        assert_eq!(plain, "id,250.2\nA1,TRUE\n");
        assert_eq!(unzipped, plain);
    }
}
