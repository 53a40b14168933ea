//! # shoebox-core: Pure Inventory Logic for Shoebox
//!
//! This crate is the **heart** of Shoebox, a small inventory tracker for a
//! shoe resale shop. It holds every rule about items, prices, searches,
//! CSV rows and reports as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shoebox Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐       │
//! │  │   apps/cli  (clap)       │      │   apps/web  (axum)       │       │
//! │  └────────────┬─────────────┘      └─────────────┬────────────┘       │
//! │               └──────────────┬───────────────────┘                     │
//! │                              │                                          │
//! │  ┌───────────────────────────▼─────────────────────────────────────┐   │
//! │  │               ★ shoebox-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────┐ ┌────────┐  │   │
//! │  │  │  types  │ │  money  │ │validation │ │ query  │ │ import │  │   │
//! │  │  │  Item   │ │  Money  │ │ drafts    │ │ Search │ │ rows   │  │   │
//! │  │  │ Barcode │ │         │ │ patches   │ │ Result │ │        │  │   │
//! │  │  └─────────┘ └─────────┘ └───────────┘ └────────┘ └────────┘  │   │
//! │  │                 ┌──────────┐   ┌──────────┐                    │   │
//! │  │                 │  report  │   │ settings │                    │   │
//! │  │                 └──────────┘   └──────────┘                    │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │  ┌───────────────────────────▼─────────────────────────────────────┐   │
//! │  │               shoebox-db (Database Layer)                       │   │
//! │  │      SQLite store, barcode index, CSV import/export files       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, BarcodeRecord, stats)
//! - [`money`] - Integer money with decimal parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Draft / patch validation
//! - [`query`] - Search queries and paged results
//! - [`import`] - CSV header mapping and row parsing
//! - [`report`] - CSV / HTML rendering
//! - [`settings`] - Required fields, defaults, import encodings
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: "today" and "now" are parameters, never read here
//! 2. **Integer Money**: prices are minor units (i64), parsed via decimals
//! 3. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod import;
pub mod money;
pub mod query;
pub mod report;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, ImportError, RowError, ValidationError};
pub use import::{ImportResult, RowFailure};
pub use money::Money;
pub use query::{SearchQuery, SearchResult, SortField, SortOrder};
pub use report::{ReportFormat, ReportOptions};
pub use settings::{ImportSettings, InventorySettings};
pub use types::{
    BarcodeAutofill, BarcodeRecord, InventoryItem, InventoryStats, ItemField, NewItem, SellOutcome,
};
pub use validation::{ItemDraft, ItemPatch};
