//! # shoebox-db: Database Layer for Shoebox
//!
//! This crate provides storage and file I/O for the Shoebox inventory.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shoebox Data Flow                                │
//! │                                                                         │
//! │  `shoebox list --vendor KREAM`          GET /api/items?vendor=KREAM    │
//! │       │                                        │                        │
//! │       └───────────────────┬────────────────────┘                        │
//! │                           ▼                                             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shoebox-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ItemRepo      │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ BarcodeRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │   ┌───────────────┐    ┌───────┴───────┐    ┌──────────────┐  │   │
//! │  │   │  CsvImporter  │───►│ ExportService │    │  AppConfig   │  │   │
//! │  │   │  (import.rs)  │    │  (export.rs)  │    │ (config.rs)  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (shoebox.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Item and barcode repositories
//! - [`import`] - Bulk CSV import with per-row error reporting
//! - [`export`] - CSV / HTML report files
//! - [`config`] - `shoebox.toml` + environment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shoebox_db::{AppConfig, Database};
//!
//! let config = AppConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let page = db.items().search(&SearchQuery::new().keyword("dunk")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError, DatabaseSettings, WebSettings};
pub use error::{DbError, DbResult};
pub use export::ExportService;
pub use import::{CsvImporter, ImportOptions};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::barcode::BarcodeRepository;
pub use repository::item::ItemRepository;
