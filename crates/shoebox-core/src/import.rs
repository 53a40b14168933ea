//! # CSV Row Parsing
//!
//! The pure half of the Bulk Import Pipeline: header mapping and per-row
//! parsing. Reading bytes, decoding, persisting and writing the error
//! report live in `shoebox_db::import`.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  READ ──► MAP_COLUMNS ──► per row: PARSE ──► VALIDATE ──► collect      │
//! │  (db)     (this module)          (this module)                         │
//! │                                                   │                    │
//! │                      PERSIST_VALID_SUBSET ◄───────┘                    │
//! │                      (db, one transaction)                             │
//! │                               │                                        │
//! │                      WRITE_ERROR_REPORT (db, only if any row failed)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row failures never abort the import; header problems do.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use ts_rs::TS;

use crate::error::{ImportError, RowError};
use crate::money::Money;
use crate::settings::InventorySettings;
use crate::types::{ItemField, NewItem};
use crate::validation::{validate_draft, ItemDraft};

/// Date formats tried in order; the first that parses wins.
///
/// Month-first is tried before day-first, so `03/04/2024` is 4 March.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%d/%m/%Y"];

// =============================================================================
// Column Mapping
// =============================================================================

/// Which CSV column holds each item field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; ItemField::ALL.len()],
}

impl ColumnMap {
    /// Maps header cells to fields through their aliases.
    ///
    /// For each field the first matching header binds. Fails with every
    /// missing required column at once.
    pub fn from_headers<S: AsRef<str>>(
        headers: &[S],
        settings: &InventorySettings,
    ) -> Result<Self, ImportError> {
        let mut columns = [None; ItemField::ALL.len()];

        for field in ItemField::ALL {
            columns[field.index()] = headers
                .iter()
                .position(|header| field.matches_header(header.as_ref()));
        }

        let missing: Vec<String> = ItemField::ALL
            .into_iter()
            .filter(|f| settings.is_required(*f) && columns[f.index()].is_none())
            .map(|f| f.as_str().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(ColumnMap { columns })
    }

    /// Header-less input: columns follow [`ItemField::ALL`] order.
    pub fn positional() -> Self {
        let mut columns = [None; ItemField::ALL.len()];
        for field in ItemField::ALL {
            columns[field.index()] = Some(field.index());
        }
        ColumnMap { columns }
    }

    pub fn column(&self, field: ItemField) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Trimmed, non-empty cell for `field`, if any.
    pub fn cell<'a, S: AsRef<str>>(&self, row: &'a [S], field: ItemField) -> Option<&'a str> {
        self.column(field)
            .and_then(|i| row.get(i))
            .map(|cell| cell.as_ref().trim())
            .filter(|cell| !cell.is_empty())
    }
}

// =============================================================================
// Cell Parsers
// =============================================================================

/// Parses a date against [`DATE_FORMATS`].
pub fn parse_date(field: ItemField, value: &str) -> Result<NaiveDate, RowError> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| RowError::DateFormat {
            field: field.as_str().to_string(),
            value: value.to_string(),
        })
}

/// Parses a price cell such as `₩1,000`, `149000` or `89,000원`.
pub fn parse_price(value: &str) -> Result<Money, RowError> {
    Money::parse(value).map_err(|_| RowError::PriceFormat {
        value: value.trim().to_string(),
    })
}

// =============================================================================
// Row Parsing
// =============================================================================

/// Parses and validates one data row.
///
/// A required field whose cell is empty (or whose column lies beyond the
/// end of a short row) fails with [`RowError::RequiredField`].
pub fn parse_row<S: AsRef<str>>(
    row: &[S],
    columns: &ColumnMap,
    settings: &InventorySettings,
    today: NaiveDate,
) -> Result<NewItem, RowError> {
    for field in ItemField::ALL {
        if settings.is_required(field) && columns.cell(row, field).is_none() {
            return Err(RowError::RequiredField {
                field: field.as_str().to_string(),
            });
        }
    }

    let text = |field: ItemField| columns.cell(row, field).map(str::to_string);

    let purchase_date = columns
        .cell(row, ItemField::PurchaseDate)
        .map(|v| parse_date(ItemField::PurchaseDate, v))
        .transpose()?;
    let sale_date = columns
        .cell(row, ItemField::SaleDate)
        .map(|v| parse_date(ItemField::SaleDate, v))
        .transpose()?;
    let price = columns
        .cell(row, ItemField::Price)
        .map(parse_price)
        .transpose()?;

    let draft = ItemDraft {
        location: text(ItemField::Location),
        purchase_date,
        sale_date,
        model_name: text(ItemField::ModelName),
        name: text(ItemField::Name),
        size: text(ItemField::Size),
        vendor: text(ItemField::Vendor),
        price: price.map(|p| p.to_decimal()),
        notes: text(ItemField::Notes),
        barcode: text(ItemField::Barcode),
    };

    validate_draft(draft, settings, today).map_err(RowError::from)
}

// =============================================================================
// Import Outcome
// =============================================================================

/// A rejected row, kept for the error report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RowFailure {
    /// 1-based record number in the file (data starts at 2 after a header).
    pub row_number: usize,
    pub raw: Vec<String>,
    pub message: String,
}

/// Summary of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportResult {
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<RowFailure>,
    #[ts(as = "Option<String>")]
    pub error_report_path: Option<PathBuf>,
}

impl ImportResult {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
