//! # Error Types
//!
//! Domain-specific error types for shoebox-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shoebox-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── ImportError      - Whole-file import failures (abort the import)  │
//! │  └── RowError         - Single CSV row failures (never abort)          │
//! │                                                                         │
//! │  shoebox-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Front-end errors (in apps)                                            │
//! │  ├── ApiError         - JSON body + HTTP status                        │
//! │  └── CliError         - message + exit code                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every validation error names the field and the rule it broke
//! 3. Errors are enum variants, never String
//! 4. Row-level import errors stay inside their row

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core inventory errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No item with this id.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// No unsold item carries this barcode.
    #[error("No unsold item with barcode: {0}")]
    BarcodeNotFound(String),

    /// The item already has a sale date.
    ///
    /// ## User Workflow
    /// ```text
    /// sell(id, 2024-03-01)
    ///      │
    ///      ▼
    /// item.sale_date = Some(2024-02-10)
    ///      │
    ///      ▼
    /// AlreadySold { id, sale_date: 2024-02-10 }   (date left untouched)
    /// ```
    #[error("Item {id} was already sold on {sale_date}")]
    AlreadySold { id: String, sale_date: NaiveDate },

    /// A report could not be rendered.
    #[error("Report rendering failed: {0}")]
    Render(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any store access; nothing is partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Sale happened before purchase.
    #[error("sale_date {sale_date} is before purchase_date {purchase_date}")]
    DateOrder {
        purchase_date: NaiveDate,
        sale_date: NaiveDate,
    },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Lower bound of a range filter is above its upper bound.
    #[error("{field} range is inverted: {from} > {to}")]
    InvalidRange {
        field: String,
        from: String,
        to: String,
    },

    /// Invalid format (e.g., unparseable date or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Negative { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
            ValidationError::DateOrder { .. } => "sale_date",
        }
    }
}

// =============================================================================
// Import Errors
// =============================================================================

/// Errors that abort a whole CSV import before any row is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The requested encoding and every fallback failed to decode the input.
    #[error("Could not decode input (tried: {})", tried.join(", "))]
    Encoding { tried: Vec<String> },

    /// The encoding label is not recognised.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// No data rows.
    #[error("Input contains no data rows")]
    EmptyInput,

    /// Header is present but required columns are absent.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The CSV structure itself could not be read.
    #[error("Malformed CSV: {0}")]
    Malformed(String),
}

/// Errors confined to one CSV row.
///
/// The pipeline records these and moves on to the next row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Invalid date in {field}: '{value}'")]
    DateFormat { field: String, value: String },

    #[error("Invalid price: '{value}'")]
    PriceFormat { value: String },

    #[error("Required field '{field}' is empty")]
    RequiredField { field: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
