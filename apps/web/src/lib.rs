//! # shoebox-web
//!
//! JSON API over the Shoebox inventory.
//!
//! ## Routes
//! ```text
//! GET    /health                             liveness + database check
//! GET    /api/items                          search (filters, sort, page/page_size)
//! POST   /api/items                          create (ItemDraft body)
//! POST   /api/items/bulk-delete              { "ids": [...] }
//! GET    /api/items/{id}                     one item
//! PUT    /api/items/{id}                     update (ItemPatch body)
//! DELETE /api/items/{id}                     delete
//! POST   /api/items/{id}/sell                ?sale_date=YYYY-MM-DD (default today)
//! GET    /api/items/barcode/{barcode}        unsold units with this barcode
//! POST   /api/items/barcode/{barcode}/sell   sell newest unsold unit
//! GET    /api/barcodes/{barcode}             barcode record
//! GET    /api/barcode-info/{barcode}         autofill values (found: bool)
//! GET    /api/filters                        distinct locations / vendors
//! GET    /api/stats                          whole-store statistics
//! POST   /api/import                         raw CSV body → ImportResult
//! GET    /api/reports/items                  ?format=csv|html&title=… + filters
//! GET    /api/reports/stats                  statistics HTML
//! ```
//!
//! [`app`] builds the router without binding a socket so tests can drive it
//! with `tower::ServiceExt::oneshot`.

pub mod dto;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use shoebox_core::InventorySettings;
use shoebox_db::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Arc<InventorySettings>,
}

impl AppState {
    pub fn new(db: Database, settings: InventorySettings) -> Self {
        AppState {
            db,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the full application: routes, tracing and CORS layers.
pub fn app(state: AppState) -> Router {
    routes::create_routes()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the configured level plus request traces.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},tower_http=debug,sqlx=warn")));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
