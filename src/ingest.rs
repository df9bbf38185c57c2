// Ingestion pipeline: directory scan → per-file detection → column mapping → row normalization
//
// Failures are contained at the smallest scope: a bad row is skipped, a bad
// file is logged and skipped, and only an unreadable directory stops the scan.

use crate::catalog::{Catalog, PriceRecord};
use crate::columns::{map_columns, ColumnRole, ResolvedColumns};
use crate::config::IngestConfig;
use crate::detect::{read_price_file, DetectError, Delimiter, FileFormat};
use csv::{ReaderBuilder, StringRecord};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// ERRORS & ROW OUTCOMES
// ============================================================================

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: {source}")]
    File {
        file: String,
        #[source]
        source: DetectError,
    },

    #[error("{file}: invalid CSV header: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// Why a data row was left out of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// CSV reader could not read the record
    Malformed,
    /// Row ends before one of the required columns
    ShortRow,
    InvalidPrice,
    InvalidWeight,
    NonPositivePrice,
    /// Zero or negative weight; unit price would be undefined
    NonPositiveWeight,
    /// price / weight does not fit in an f64
    UnitPriceOverflow,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::Malformed => "malformed",
            SkipReason::ShortRow => "short row",
            SkipReason::InvalidPrice => "invalid price",
            SkipReason::InvalidWeight => "invalid weight",
            SkipReason::NonPositivePrice => "non-positive price",
            SkipReason::NonPositiveWeight => "non-positive weight",
            SkipReason::UnitPriceOverflow => "unit price overflow",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of normalizing one data row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(PriceRecord),
    Skipped(SkipReason),
}

/// Parse a numeric cell. Surrounding whitespace is ignored; with
/// `decimal_comma` a lone comma acts as the decimal point ("12,5").
/// A comma followed by exactly three digits reads as a thousands group
/// ("1,000") and is rejected either way.
pub fn parse_number(raw: &str, decimal_comma: bool) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value = match trimmed.split_once(',') {
        Some((whole, fraction))
            if decimal_comma
                && !trimmed.contains('.')
                && !fraction.contains(',')
                && !is_thousands_group(fraction) =>
        {
            format!("{whole}.{fraction}").parse::<f64>().ok()?
        }
        _ => trimmed.parse::<f64>().ok()?,
    };

    value.is_finite().then_some(value)
}

fn is_thousands_group(fraction: &str) -> bool {
    fraction.len() == 3 && fraction.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// PER-FILE RESULT & REPORT
// ============================================================================

/// Outcome of ingesting one file that could be read and decoded
#[derive(Debug, Clone)]
pub struct FileIngest {
    pub file_name: String,
    pub format: FileFormat,
    /// `None` when the header row lacks a required column
    pub columns: Option<ResolvedColumns>,
    pub missing_columns: Vec<ColumnRole>,
    pub catalog: Catalog,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl FileIngest {
    pub fn rows_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}

/// Counters for a whole directory scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_scanned: usize,
    pub files_ingested: usize,
    pub files_missing_columns: Vec<String>,
    pub failed_files: Vec<FileFailure>,
    pub rows_accepted: usize,
    pub rows_skipped: BTreeMap<SkipReason, usize>,
}

impl IngestReport {
    pub fn rows_skipped_total(&self) -> usize {
        self.rows_skipped.values().sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files scanned, {} ingested, {} without required columns, {} failed; {} rows accepted, {} skipped",
            self.files_scanned,
            self.files_ingested,
            self.files_missing_columns.len(),
            self.failed_files.len(),
            self.rows_accepted,
            self.rows_skipped_total()
        )
    }

    fn record_file(&mut self, file: &FileIngest) {
        if file.columns.is_some() {
            self.files_ingested += 1;
        } else {
            self.files_missing_columns.push(file.file_name.clone());
        }

        self.rows_accepted += file.catalog.len();
        for (reason, count) in &file.skipped {
            *self.rows_skipped.entry(*reason).or_insert(0) += count;
        }
    }
}

/// Catalog plus what happened while building it
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub catalog: Catalog,
    pub report: IngestReport,
}

// ============================================================================
// INGESTOR
// ============================================================================

pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Ingestor { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Price list files directly inside `dir`, sorted by file name
    pub fn candidates(&self, dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
        let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Directory {
            path: dir.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!(path = %path.display(), "skipping non UTF-8 file name");
                continue;
            };

            if self.config.is_candidate(file_name) && path.is_file() {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Scan a directory and build the catalog.
    /// Only an unreadable directory is an error; file problems end up in the report.
    pub fn ingest_dir(&self, dir: &Path) -> Result<Ingested, IngestError> {
        let files = self.candidates(dir)?;
        info!(
            dir = %dir.display(),
            candidates = files.len(),
            parallel = self.config.parallel,
            "scanning price lists"
        );

        let results: Vec<(PathBuf, Result<FileIngest, IngestError>)> = if self.config.parallel {
            files
                .into_par_iter()
                .map(|path| {
                    let result = self.ingest_file(&path);
                    (path, result)
                })
                .collect()
        } else {
            files
                .into_iter()
                .map(|path| {
                    let result = self.ingest_file(&path);
                    (path, result)
                })
                .collect()
        };

        let mut ingested = Ingested::default();
        ingested.report.files_scanned = results.len();

        for (path, result) in results {
            match result {
                Ok(file) => {
                    ingested.report.record_file(&file);
                    ingested.catalog.extend(file.catalog);
                }
                Err(e) => {
                    let file_name = display_name(&path);
                    warn!(file = %file_name, error = %e, "failed to process file");
                    ingested.report.failed_files.push(FileFailure {
                        file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!("{}", ingested.report.summary());
        Ok(ingested)
    }

    /// Read, decode and normalize one file
    pub fn ingest_file(&self, path: &Path) -> Result<FileIngest, IngestError> {
        let file_name = display_name(path);

        let decoded = read_price_file(path).map_err(|source| IngestError::File {
            file: file_name.clone(),
            source,
        })?;

        let file = self.ingest_text(&decoded.text, decoded.format, &file_name)?;

        if file.columns.is_some() {
            info!(
                file = %file.file_name,
                encoding = file.format.encoding.name(),
                delimiter = %file.format.delimiter,
                records = file.catalog.len(),
                skipped = file.rows_skipped(),
                "ingested price list"
            );
        } else {
            let missing: Vec<&str> = file.missing_columns.iter().map(|r| r.label()).collect();
            debug!(file = %file.file_name, missing = ?missing, "no required columns, file skipped");
        }

        Ok(file)
    }

    /// Normalize already decoded CSV text
    pub fn ingest_text(
        &self,
        text: &str,
        format: FileFormat,
        file_name: &str,
    ) -> Result<FileIngest, IngestError> {
        let mut reader = csv_reader(text, format.delimiter);
        let mut records = reader.records();

        let mut file = FileIngest {
            file_name: file_name.to_string(),
            format,
            columns: None,
            missing_columns: ColumnRole::ALL.to_vec(),
            catalog: Catalog::new(),
            skipped: BTreeMap::new(),
        };

        let headers = match records.next() {
            Some(result) => result.map_err(|source| IngestError::Csv {
                file: file_name.to_string(),
                source,
            })?,
            None => return Ok(file),
        };

        let map = map_columns(headers.iter(), &self.config.synonyms);
        file.missing_columns = map.missing();
        let Some(columns) = map.resolve() else {
            return Ok(file);
        };
        file.columns = Some(columns);

        for result in records {
            let outcome = match result {
                Ok(record) => self.normalize_row(&record, columns, file_name),
                Err(e) => {
                    debug!(file = %file_name, error = %e, "unreadable CSV record");
                    RowOutcome::Skipped(SkipReason::Malformed)
                }
            };

            match outcome {
                RowOutcome::Accepted(record) => file.catalog.push(record),
                RowOutcome::Skipped(reason) => *file.skipped.entry(reason).or_insert(0) += 1,
            }
        }

        Ok(file)
    }

    /// Turn one data row into a record or a skip reason
    pub fn normalize_row(
        &self,
        record: &StringRecord,
        columns: ResolvedColumns,
        file_name: &str,
    ) -> RowOutcome {
        if record.len() < columns.min_row_len() {
            return RowOutcome::Skipped(SkipReason::ShortRow);
        }

        let name = &record[columns.name];
        let decimal_comma = self.config.decimal_comma;

        let Some(price) = parse_number(&record[columns.price], decimal_comma) else {
            return RowOutcome::Skipped(SkipReason::InvalidPrice);
        };
        let Some(weight) = parse_number(&record[columns.weight], decimal_comma) else {
            return RowOutcome::Skipped(SkipReason::InvalidWeight);
        };

        if weight <= 0.0 {
            return RowOutcome::Skipped(SkipReason::NonPositiveWeight);
        }
        if price <= 0.0 {
            return RowOutcome::Skipped(SkipReason::NonPositivePrice);
        }

        match PriceRecord::new(name.to_string(), price, weight, file_name.to_string()) {
            Some(record) => RowOutcome::Accepted(record),
            None => RowOutcome::Skipped(SkipReason::UnitPriceOverflow),
        }
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Ingestor::new(IngestConfig::default())
    }
}

fn csv_reader(text: &str, delimiter: Delimiter) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(text.as_bytes())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// TESTS
// ============================================================================
