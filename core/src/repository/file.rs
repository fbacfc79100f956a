use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Value};
use tempfile::NamedTempFile;

use crate::error::{RecordError, StoreError};
use crate::model::reading::{Reading, Series, MAX_COUNT};
use crate::report::Reporter;
use crate::repository::traits::{LoadedSeries, SeriesRepository};
use crate::time::{format_record_date, parse_record_date};

/// On-disk shape of one reading.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct StoredRecord {
    date: String,
    download_count: u64,
}

impl From<Reading> for StoredRecord {
    fn from(reading: Reading) -> Self {
        Self {
            date: format_record_date(reading.date),
            download_count: reading.count,
        }
    }
}

/// Series store backed by a JSON array of `{date, download_count}` records.
///
/// The file is read whole and rewritten whole. Records that cannot be parsed
/// are kept verbatim at the end of the array so a rewrite never loses them.
#[derive(Clone, Debug)]
pub struct FileSeriesRepository {
    file_path: PathBuf,
}

struct Document {
    series: Series,
    rejected: Vec<Value>,
}

impl FileSeriesRepository {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_document(&self, reporter: &dyn Reporter) -> Result<Document> {
        let file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                reporter.info(&format!(
                    "series store {} does not exist yet, starting empty",
                    self.file_path.display()
                ));
                return Ok(Document {
                    series: Series::new(),
                    rejected: Vec::new(),
                });
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.file_path.clone(),
                    source,
                }
                .into())
            }
        };

        let value: Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Parse {
                path: self.file_path.clone(),
                source,
            })?;
        let Value::Array(records) = value else {
            return Err(StoreError::NotAnArray {
                path: self.file_path.clone(),
            }
            .into());
        };

        let mut series = Series::new();
        let mut rejected = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            match parse_record(&record) {
                Ok(reading) => {
                    if let Some(previous) = series.upsert(reading) {
                        reporter.warn(&format!(
                            "record #{}: duplicate date {}, {} replaces {}",
                            index,
                            format_record_date(reading.date),
                            reading.count,
                            previous
                        ));
                    }
                }
                Err(e) => {
                    reporter.warn(&format!("record #{} rejected: {}", index, e));
                    rejected.push(record);
                }
            }
        }

        Ok(Document { series, rejected })
    }

    /// Writes to a sibling temp file and renames it over the store, so a
    /// crash mid-write leaves the previous contents intact.
    fn write_document(&self, document: &Document) -> Result<()> {
        let write_err = |source| StoreError::Write {
            path: self.file_path.clone(),
            source,
        };

        let parent = match self.file_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_err)?;

        let mut records: Vec<Value> = document
            .series
            .iter()
            .map(|reading| serde_json::to_value(StoredRecord::from(reading)))
            .collect::<serde_json::Result<_>>()?;
        records.extend(document.rejected.iter().cloned());

        let temp = NamedTempFile::new_in(parent).map_err(write_err)?;
        let mut writer = BufWriter::new(temp);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut serializer)?;
        writer.write_all(b"\n").map_err(write_err)?;

        let temp = writer.into_inner().map_err(|e| write_err(e.into_error()))?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.file_path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl SeriesRepository for FileSeriesRepository {
    fn load(&self, reporter: &dyn Reporter) -> Result<LoadedSeries> {
        let document = self.read_document(reporter)?;
        reporter.debug(&format!(
            "loaded {} readings from {} ({} rejected)",
            document.series.len(),
            self.file_path.display(),
            document.rejected.len()
        ));
        Ok(LoadedSeries {
            series: document.series,
            rejected: document.rejected.len(),
        })
    }

    fn upsert(&self, reading: Reading, reporter: &dyn Reporter) -> Result<Option<u64>> {
        let mut document = self.read_document(reporter)?;
        let previous = document.series.upsert(reading);
        self.write_document(&document)?;

        match previous {
            Some(old) => reporter.info(&format!(
                "updated {} in {}: {} -> {}",
                format_record_date(reading.date),
                self.file_path.display(),
                old,
                reading.count
            )),
            None => reporter.info(&format!(
                "recorded {} = {} in {}",
                format_record_date(reading.date),
                reading.count,
                self.file_path.display()
            )),
        }
        Ok(previous)
    }
}

fn parse_record(record: &Value) -> std::result::Result<Reading, RecordError> {
    let Value::Object(fields) = record else {
        return Err(RecordError::NotAnObject(record.to_string()));
    };

    let date = match fields.get("date") {
        None => return Err(RecordError::MissingField("date")),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(RecordError::InvalidDate(other.to_string())),
    };
    let date = parse_record_date(&date).map_err(|_| RecordError::InvalidDate(format!("{:?}", date)))?;

    let count = match fields.get("download_count") {
        None => return Err(RecordError::MissingField("download_count")),
        Some(Value::Number(n)) => number_to_count(n)
            .ok_or_else(|| RecordError::InvalidCount(n.to_string()))?,
        Some(other) => return Err(RecordError::InvalidCount(other.to_string())),
    };

    Ok(Reading::new(date, count))
}

/// Accepts integers in `0..=MAX_COUNT`, including integral floats such as `120.0`.
fn number_to_count(n: &serde_json::Number) -> Option<u64> {
    if let Some(count) = n.as_u64() {
        return (count <= MAX_COUNT).then_some(count);
    }
    let f = n.as_f64()?;
    // MAX_COUNT as f64 rounds up to 2^63, hence the strict bound
    if f >= 0.0 && f.fract() == 0.0 && f < MAX_COUNT as f64 {
        Some(f as u64)
    } else {
        None
    }
}
