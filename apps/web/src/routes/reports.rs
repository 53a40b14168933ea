//! # Report, Statistics and Import Routes
//!
//! ```text
//! GET  /api/filters          distinct locations / vendors for filter dropdowns
//! GET  /api/stats            InventoryStats as JSON
//! GET  /api/reports/items    CSV or HTML download, same filters as /api/items
//! GET  /api/reports/stats    statistics HTML
//! POST /api/import           raw CSV body → ImportResult
//! ```
//!
//! A report without filters covers the whole store. With filters it covers
//! the matching items, up to `page_size` when one is given.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;

use shoebox_core::query::MAX_LIMIT;
use shoebox_core::report::render_stats_html;
use shoebox_core::{ImportResult, InventoryStats, ReportFormat, ReportOptions};
use shoebox_db::ImportOptions;

use crate::dto::{FiltersResponse, ImportParams, ReportParams, SearchParams};
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/filters", get(filters))
        .route("/api/stats", get(stats))
        .route("/api/reports/items", get(items_report))
        .route("/api/reports/stats", get(stats_report))
        .route("/api/import", post(import_csv))
}

async fn filters(State(state): State<AppState>) -> ApiResult<Json<FiltersResponse>> {
    let items = state.db.items();
    Ok(Json(FiltersResponse {
        locations: items.locations().await?,
        vendors: items.vendors().await?,
    }))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<InventoryStats>> {
    Ok(Json(state.db.items().statistics().await?))
}

async fn items_report(
    State(state): State<AppState>,
    report: Result<Query<ReportParams>, QueryRejection>,
    search: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(report) = report?;
    let Query(search) = search?;

    let format = match report.format.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        Some(format) => format.parse::<ReportFormat>()?,
        None => ReportFormat::Csv,
    };

    let query = if search.has_filters() {
        let mut query = search.to_query()?;
        if search.page_size.is_none() {
            query.limit = MAX_LIMIT;
            query.offset = 0;
        }
        Some(query)
    } else {
        None
    };

    let mut options = ReportOptions::new(Local::now().naive_local());
    if let Some(title) = report.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        options = options.title(title);
    }

    let body = state.db.exporter().render(query, format, &options).await?;
    let disposition = format!(
        "attachment; filename=\"inventory_report.{}\"",
        format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn stats_report(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let items = state.db.items();
    let stats = items.statistics().await?;
    let vendors = items.vendors().await?;
    let locations = items.locations().await?;

    Ok(Html(render_stats_html(
        &stats,
        &vendors,
        &locations,
        Local::now().naive_local(),
    )))
}

/// Imports an uploaded CSV. Row failures are part of the 200 response; a
/// file that cannot be read at all is a 400.
async fn import_csv(
    State(state): State<AppState>,
    params: Result<Query<ImportParams>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<ImportResult>> {
    let Query(params) = params?;
    let options = ImportOptions {
        has_header: params.has_header,
        encoding: params.encoding,
    };

    let result = state
        .db
        .importer(state.settings.as_ref().clone())
        .import_bytes(&body, &options, None)
        .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};

    use crate::routes::test_support::{create_item, get_json, send, test_app};

    const CSV: &str = "위치,구매일,모델명,이름,사이즈,구매처,가격,바코드\n\
                       A-01,2024-03-01,DD1391-100,Dunk Low,270,KREAM,\"₩139,000\",8801\n\
                       B-02,2024/03/02,FD2596-600,Air Force 1,265,무신사,119000,\n\
                       C-03,not-a-date,X,Y,,Z,1000,\n";

    async fn import(app: &axum::Router, uri: &str, csv: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "text/csv")
            .body(Body::from(csv.to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_import_reports_row_failures() {
        let (app, _db) = test_app().await;

        let (status, json) = import(&app, "/api/import", CSV).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success_count"], 2);
        assert_eq!(json["error_count"], 1);
        assert_eq!(json["errors"][0]["row_number"], 4);
        assert!(json["error_report_path"].is_null());

        let (_, json) = get_json(&app, "/api/filters").await;
        assert_eq!(json["locations"], serde_json::json!(["A-01", "B-02"]));

        let (_, json) = get_json(&app, "/api/stats").await;
        assert_eq!(json["total_items"], 2);
    }

    #[tokio::test]
    async fn test_import_unreadable_input() {
        let (app, _db) = test_app().await;

        let (status, json) = import(&app, "/api/import", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");

        let (status, _) = import(&app, "/api/import", "foo,bar\n1,2\n").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_items_report_formats() {
        let (app, _db) = test_app().await;
        create_item(&app, "AAA", "1000", None).await;
        create_item(&app, "BBB", "2000", None).await;

        let request = Request::get("/api/reports/items").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let csv = String::from_utf8(body).unwrap();
        assert!(csv.contains("AAA"));
        assert!(csv.contains("BBB"));

        let request = Request::get("/api/reports/items?format=html&title=Weekly&keyword=bbb")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("Weekly"));
        assert!(html.contains("BBB"));
        assert!(!html.contains("AAA name"));

        let request = Request::get("/api/reports/items?format=pdf").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_report_is_html() {
        let (app, _db) = test_app().await;
        create_item(&app, "AAA", "1000", None).await;

        let response_request = Request::get("/api/reports/stats").body(Body::empty()).unwrap();
        let (status, body) = send(&app, response_request).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("KREAM"));
        assert!(html.contains("A-01"));
    }
}
