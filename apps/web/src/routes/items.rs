//! # Item Routes
//!
//! CRUD, search and sell endpoints under `/api/items`.
//!
//! ## Sell outcomes
//! ```text
//! Sold         → 200 ItemDto
//! AlreadySold  → 409 CONFLICT
//! NotFound     → 404 NOT_FOUND
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use tracing::debug;

use shoebox_core::validation::validate_draft;
use shoebox_core::{CoreError, ItemDraft, ItemPatch, SellOutcome};

use crate::dto::{
    BarcodeItemsResponse, BulkDeleteRequest, BulkDeleteResponse, ItemDto, MessageResponse,
    SearchParams, SearchResponse, SellParams,
};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(search_items).post(create_item))
        .route("/api/items/bulk-delete", post(bulk_delete))
        .route(
            "/api/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/api/items/{id}/sell", post(sell_item))
        .route("/api/items/barcode/{barcode}", get(items_by_barcode))
        .route("/api/items/barcode/{barcode}/sell", post(sell_by_barcode))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// =============================================================================
// Search / CRUD
// =============================================================================

async fn search_items(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Query(params) = params?;
    let query = params.to_query()?;
    let result = state.db.items().search(&query).await?;
    Ok(Json(result.into()))
}

async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<ItemDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ItemDto>)> {
    let Json(draft) = payload?;
    let new = validate_draft(draft, &state.settings, today())?;
    let item = state.db.items().create(new).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemDto>> {
    let item = state
        .db
        .items()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::ItemNotFound(id))?;
    Ok(Json(item.into()))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> ApiResult<Json<ItemDto>> {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    let item = state
        .db
        .items()
        .update(&id, &patch)
        .await?
        .ok_or(CoreError::ItemNotFound(id))?;
    Ok(Json(item.into()))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.db.items().delete(&id).await? {
        return Err(CoreError::ItemNotFound(id).into());
    }
    Ok(Json(MessageResponse::new(format!("Deleted item {id}"))))
}

async fn bulk_delete(
    State(state): State<AppState>,
    payload: Result<Json<BulkDeleteRequest>, JsonRejection>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let Json(request) = payload?;
    if request.ids.is_empty() {
        return Err(ApiError::validation("ids must not be empty"));
    }

    let deleted = state.db.items().bulk_delete(&request.ids).await?;
    debug!(requested = request.ids.len(), deleted, "Bulk delete");
    Ok(Json(BulkDeleteResponse {
        requested: request.ids.len(),
        deleted,
    }))
}

// =============================================================================
// Barcode / Sell
// =============================================================================

async fn items_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<BarcodeItemsResponse>> {
    let items = state.db.items().unsold_by_barcode(&barcode).await?;
    Ok(Json(BarcodeItemsResponse {
        count: items.len(),
        items: items.into_iter().map(ItemDto::from).collect(),
    }))
}

async fn sell_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<SellParams>, QueryRejection>,
) -> ApiResult<Json<ItemDto>> {
    let Query(params) = params?;
    let sale_date = params.sale_date.unwrap_or_else(today);
    let outcome = state.db.items().sell(&id, sale_date).await?;
    sold(outcome, sale_date, || CoreError::ItemNotFound(id))
}

async fn sell_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
    params: Result<Query<SellParams>, QueryRejection>,
) -> ApiResult<Json<ItemDto>> {
    let Query(params) = params?;
    let sale_date = params.sale_date.unwrap_or_else(today);
    let outcome = state.db.items().sell_by_barcode(&barcode, sale_date).await?;
    sold(outcome, sale_date, || CoreError::BarcodeNotFound(barcode))
}

fn sold(
    outcome: SellOutcome,
    sale_date: NaiveDate,
    not_found: impl FnOnce() -> CoreError,
) -> ApiResult<Json<ItemDto>> {
    match outcome {
        SellOutcome::Sold(item) => Ok(Json(item.into())),
        SellOutcome::AlreadySold(item) => Err(CoreError::AlreadySold {
            id: item.id,
            sale_date: item.sale_date.unwrap_or(sale_date),
        }
        .into()),
        SellOutcome::NotFound => Err(not_found().into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{create_item, get_json, send_json, test_app};

    #[tokio::test]
    async fn test_create_and_get() {
        let (app, _db) = test_app().await;
        let id = create_item(&app, "DD1391-100", "139000", Some("8801")).await;

        let (status, json) = get_json(&app, &format!("/api/items/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["model_name"], "DD1391-100");
        assert_eq!(json["price_cents"], 13_900_000);
        assert_eq!(json["price"], "139000.00");
        assert_eq!(json["is_sold"], false);
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let (app, _db) = test_app().await;

        let (status, json) = send_json(
            &app,
            "POST",
            "/api/items",
            json!({ "location": "A-01", "purchase_date": "2024-04-01", "name": "x", "vendor": "v", "price": "1" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");

        let (status, _) = send_json(
            &app,
            "POST",
            "/api/items",
            json!({
                "location": "A-01", "purchase_date": "2024-04-01", "model_name": "M",
                "name": "x", "vendor": "v", "price": "-5"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = send_json(&app, "POST", "/api/items", json!({ "purchase_date": "yesterday" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_search_sort_and_page() {
        let (app, _db) = test_app().await;
        create_item(&app, "AAA", "300", None).await;
        create_item(&app, "BBB", "100", None).await;
        create_item(&app, "CCC", "200", None).await;

        let (status, json) =
            get_json(&app, "/api/items?sort_by=price&sort_order=asc&page=1&page_size=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_count"], 3);
        assert_eq!(json["has_more"], true);
        assert_eq!(json["items"][0]["model_name"], "BBB");
        assert_eq!(json["items"][1]["model_name"], "CCC");

        let (_, json) = get_json(&app, "/api/items?sort_by=price&sort_order=asc&page=2&page_size=2").await;
        assert_eq!(json["items"][0]["model_name"], "AAA");
        assert_eq!(json["has_more"], false);

        let (_, json) = get_json(&app, "/api/items?keyword=bb").await;
        assert_eq!(json["total_count"], 1);

        let (status, _) = get_json(&app, "/api/items?sort_by=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (app, _db) = test_app().await;
        let id = create_item(&app, "M1", "1000", None).await;
        let uri = format!("/api/items/{id}");

        let (status, json) = send_json(&app, "PUT", &uri, json!({ "location": "Z-9", "notes": "box damaged" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["location"], "Z-9");
        assert_eq!(json["notes"], "box damaged");

        let (status, _) = send_json(&app, "PUT", &uri, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&app, "PUT", "/api/items/missing", json!({ "location": "Z" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_json(&app, "DELETE", &uri, json!(null)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = send_json(&app, "DELETE", &uri, json!(null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let (app, _db) = test_app().await;
        let a = create_item(&app, "A", "1", None).await;
        let b = create_item(&app, "B", "1", None).await;

        let (status, json) = send_json(
            &app,
            "POST",
            "/api/items/bulk-delete",
            json!({ "ids": [a, b, "missing"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["requested"], 3);
        assert_eq!(json["deleted"], 2);

        let (status, _) = send_json(&app, "POST", "/api/items/bulk-delete", json!({ "ids": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sell_flow() {
        let (app, _db) = test_app().await;
        let id = create_item(&app, "M1", "1000", Some("880")).await;
        create_item(&app, "M1", "1000", Some("880")).await;

        let (_, json) = get_json(&app, "/api/items/barcode/880").await;
        assert_eq!(json["count"], 2);

        let uri = format!("/api/items/{id}/sell?sale_date=2024-05-01");
        let (status, json) = send_json(&app, "POST", &uri, json!(null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sale_date"], "2024-05-01");
        assert_eq!(json["is_sold"], true);

        let (status, json) = send_json(&app, "POST", &uri, json!(null)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "CONFLICT");

        let (status, _) =
            send_json(&app, "POST", "/api/items/barcode/880/sell?sale_date=2024-05-02", json!(null)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = get_json(&app, "/api/items/barcode/880").await;
        assert_eq!(json["count"], 0);

        let (status, _) = send_json(&app, "POST", "/api/items/barcode/880/sell", json!(null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_json(&app, "POST", "/api/items/nope/sell", json!(null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
