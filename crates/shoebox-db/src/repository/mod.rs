//! # Repository Module
//!
//! Database repository implementations for Shoebox.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command / web handler                                             │
//! │       │                                                                 │
//! │       │  db.items().search(&query)                                     │
//! │       ▼                                                                 │
//! │  ItemRepository                                                        │
//! │  ├── create / bulk_create   ──► also upserts BarcodeRecord (same tx)   │
//! │  ├── get_by_id / get_all / search / statistics                         │
//! │  ├── update / delete / bulk_delete                                     │
//! │  └── sell / sell_by_barcode                                            │
//! │       │                                                                 │
//! │       │  SQL (one transaction per logical operation)                   │
//! │       ▼                                                                 │
//! │  SQLite: inventory_items, barcode_records                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories hand back plain structs; nothing is tied to a live
//! connection once a call returns.
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Item CRUD, search, statistics, selling
//! - [`barcode::BarcodeRepository`] - Barcode side index

pub mod barcode;
pub mod item;
