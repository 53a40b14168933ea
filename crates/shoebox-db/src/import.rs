//! # CSV Import
//!
//! The I/O half of the Bulk Import Pipeline: decoding bytes, persisting the
//! parsed rows and writing the error report. Header mapping and row parsing
//! are pure and live in `shoebox_core::import`.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      import_file("stock.csv")                           │
//! │                                                                         │
//! │  bytes ──► decode: utf-8 ─✗─► windows-949 ─✗─► euc-kr ─✗─► ...         │
//! │                       │ ✓                                               │
//! │                       ▼                                                 │
//! │  csv records ──► ColumnMap (header) or positional                       │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │  row 2 ──► parse_row ──► NewItem ──┐                                    │
//! │  row 3 ──► parse_row ──► RowError  │──► failures                        │
//! │  row 4 ──► parse_row ──► NewItem ──┤                                    │
//! │                                    ▼                                    │
//! │                 items.bulk_create(valid)   (one transaction)            │
//! │                       │ ✗ → every valid row becomes a failure           │
//! │                       ▼                                                 │
//! │  failures? ──► import_errors_YYYYMMDD_HHMMSS.csv  (Row, Error, Data)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use chrono::Local;
use encoding_rs::Encoding;
use tracing::{error, info, warn};

use shoebox_core::import::{parse_row, ColumnMap};
use shoebox_core::{ImportError, ImportResult, InventorySettings, NewItem, RowFailure};

use crate::error::{DbError, DbResult};
use crate::repository::item::ItemRepository;

/// UTF-8 byte-order mark as decoded text.
const BOM: char = '\u{feff}';

/// Per-call import options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// First record is a header row.
    pub has_header: bool,
    /// Encoding to try first; `None` uses the configured default.
    pub encoding: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            has_header: true,
            encoding: None,
        }
    }
}

/// Imports CSV files into the item store.
#[derive(Debug, Clone)]
pub struct CsvImporter {
    items: ItemRepository,
    settings: InventorySettings,
}

impl CsvImporter {
    pub fn new(items: ItemRepository, settings: InventorySettings) -> Self {
        CsvImporter { items, settings }
    }

    /// Imports a file. The error report, if any, is written next to it.
    pub async fn import_file(
        &self,
        path: impl AsRef<Path>,
        options: &ImportOptions,
    ) -> DbResult<ImportResult> {
        let path = path.as_ref();
        info!(path = %path.display(), "Importing CSV file");

        let bytes = tokio::fs::read(path).await?;
        let report_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        self.import_bytes(&bytes, options, Some(&report_dir)).await
    }

    /// Imports raw CSV bytes (e.g. an upload).
    ///
    /// No error report is written when `report_dir` is `None`; the failures
    /// are still returned in the result.
    pub async fn import_bytes(
        &self,
        bytes: &[u8],
        options: &ImportOptions,
        report_dir: Option<&Path>,
    ) -> DbResult<ImportResult> {
        let primary = options
            .encoding
            .as_deref()
            .unwrap_or(&self.settings.import.encoding);
        let text = decode_input(bytes, primary, &self.settings.import.fallback_encodings)?;
        let records = read_records(&text)?;

        if records.is_empty() {
            return Err(ImportError::EmptyInput.into());
        }

        let (columns, first_data) = if options.has_header {
            (ColumnMap::from_headers(&records[0], &self.settings)?, 1)
        } else {
            (ColumnMap::positional(), 0)
        };

        let today = Local::now().date_naive();
        let mut parsed: Vec<(usize, Vec<String>, NewItem)> = Vec::new();
        let mut failures: Vec<RowFailure> = Vec::new();

        for (index, raw) in records.into_iter().enumerate().skip(first_data) {
            if raw.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let row_number = index + 1;

            match parse_row(&raw, &columns, &self.settings, today) {
                Ok(item) => parsed.push((row_number, raw, item)),
                Err(err) => {
                    warn!(row = row_number, error = %err, "Skipping invalid import row");
                    failures.push(RowFailure {
                        row_number,
                        raw,
                        message: err.to_string(),
                    });
                }
            }
        }

        if parsed.is_empty() && failures.is_empty() {
            return Err(ImportError::EmptyInput.into());
        }

        let mut success_count = 0;
        if !parsed.is_empty() {
            let (rows, items): (Vec<_>, Vec<_>) = parsed
                .into_iter()
                .map(|(row_number, raw, item)| ((row_number, raw), item))
                .unzip();

            match self.items.bulk_create(items).await {
                Ok(created) => success_count = created.len(),
                Err(err) => {
                    error!(error = %err, rows = rows.len(), "Bulk insert failed; rejecting batch");
                    let message = err.to_string();
                    failures.extend(rows.into_iter().map(|(row_number, raw)| RowFailure {
                        row_number,
                        raw,
                        message: message.clone(),
                    }));
                }
            }
        }

        failures.sort_by_key(|failure| failure.row_number);

        let error_report_path = match report_dir {
            Some(dir) if !failures.is_empty() => Some(write_error_report(dir, &failures).await?),
            _ => None,
        };

        info!(
            success = success_count,
            errors = failures.len(),
            "CSV import finished"
        );

        Ok(ImportResult {
            success_count,
            error_count: failures.len(),
            errors: failures,
            error_report_path,
        })
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes `bytes` strictly, trying `primary` then each fallback in order.
///
/// A leading UTF-8 byte-order mark is dropped. Unknown fallback labels are
/// skipped; an unknown primary label is an error.
pub fn decode_input(bytes: &[u8], primary: &str, fallbacks: &[String]) -> Result<String, ImportError> {
    let primary_encoding = Encoding::for_label(primary.trim().as_bytes())
        .ok_or_else(|| ImportError::UnknownEncoding(primary.to_string()))?;

    let fallback_encodings = fallbacks.iter().filter_map(|label| {
        let encoding = Encoding::for_label(label.trim().as_bytes());
        if encoding.is_none() {
            warn!(label = %label, "Ignoring unknown fallback encoding");
        }
        encoding
    });

    let mut tried: Vec<String> = Vec::new();
    for encoding in std::iter::once(primary_encoding).chain(fallback_encodings) {
        let name = encoding.name().to_string();
        // Several labels can name the same encoding.
        if tried.contains(&name) {
            continue;
        }
        tried.push(name);

        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            if encoding != primary_encoding {
                warn!(encoding = encoding.name(), "Decoded import with fallback encoding");
            }
            let text = text.into_owned();
            return Ok(match text.strip_prefix(BOM) {
                Some(rest) => rest.to_string(),
                None => text,
            });
        }
    }

    Err(ImportError::Encoding { tried })
}

fn read_records(text: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| ImportError::Malformed(e.to_string()))
        })
        .collect()
}

// =============================================================================
// Error Report
// =============================================================================

/// Writes `Row,Error,Data` for every failed row; `Data` is a JSON array of
/// the raw cells.
async fn write_error_report(dir: &Path, failures: &[RowFailure]) -> DbResult<PathBuf> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Row", "Error", "Data"])?;
    for failure in failures {
        let data = serde_json::to_string(&failure.raw)
            .map_err(|e| DbError::Internal(e.to_string()))?;
        writer.write_record([failure.row_number.to_string(), failure.message.clone(), data])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DbError::Internal(e.to_string()))?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(
        Local::now()
            .format("import_errors_%Y%m%d_%H%M%S.csv")
            .to_string(),
    );
    tokio::fs::write(&path, bytes).await?;

    warn!(path = %path.display(), count = failures.len(), "Wrote import error report");
    Ok(path)
}

// =============================================================================
// Unit Tests
// =============================================================================
