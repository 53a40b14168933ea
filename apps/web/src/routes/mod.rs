//! Route table. Each area exposes `routes()`; [`create_routes`] merges them.

mod barcodes;
mod health;
mod items;
mod reports;

use axum::Router;

use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(items::routes())
        .merge(barcodes::routes())
        .merge(reports::routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use shoebox_core::InventorySettings;
    use shoebox_db::{Database, DbConfig};

    use crate::{app, AppState};

    pub async fn test_app() -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db.clone(), InventorySettings::default());
        (app(state), db)
    }

    /// Sends a request and returns status plus raw body.
    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// Creates an item through the API and returns its id.
    pub async fn create_item(app: &Router, model: &str, price: &str, barcode: Option<&str>) -> String {
        let (status, json) = send_json(
            app,
            "POST",
            "/api/items",
            serde_json::json!({
                "location": "A-01",
                "purchase_date": "2024-04-01",
                "model_name": model,
                "name": format!("{model} name"),
                "vendor": "KREAM",
                "price": price,
                "size": "270",
                "barcode": barcode,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().to_string()
    }
}
