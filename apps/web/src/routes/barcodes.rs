use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use shoebox_core::{BarcodeAutofill, BarcodeRecord, CoreError};

use crate::dto::BarcodeInfoResponse;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/barcodes/{barcode}", get(get_barcode))
        .route("/api/barcode-info/{barcode}", get(barcode_info))
}

async fn get_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<BarcodeRecord>> {
    let record = state
        .db
        .barcodes()
        .get(&barcode)
        .await?
        .ok_or(CoreError::BarcodeNotFound(barcode))?;
    Ok(Json(record))
}

/// Values of the newest item with this barcode, for pre-filling a form.
/// Unknown barcodes answer `{"found": false}` with status 200.
async fn barcode_info(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<BarcodeInfoResponse>> {
    let latest = state.db.items().latest_by_barcode(&barcode).await?;
    Ok(Json(latest.as_ref().map(BarcodeAutofill::from).into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{create_item, get_json, test_app};

    #[tokio::test]
    async fn test_barcode_record_and_autofill() {
        let (app, _db) = test_app().await;
        create_item(&app, "DD1391-100", "139000", Some("8801234567890")).await;

        let (status, json) = get_json(&app, "/api/barcodes/8801234567890").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["model_name"], "DD1391-100");
        assert_eq!(json["name"], "DD1391-100 name");

        let (status, json) = get_json(&app, "/api/barcode-info/8801234567890").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["found"], true);
        assert_eq!(json["size"], "270");
        assert_eq!(json["vendor"], "KREAM");
        assert_eq!(json["price"], "139000.00");
    }

    #[tokio::test]
    async fn test_unknown_barcode() {
        let (app, _db) = test_app().await;

        let (status, json) = get_json(&app, "/api/barcodes/000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");

        let (status, json) = get_json(&app, "/api/barcode-info/000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "found": false }));
    }
}
