//! HTTP routes

pub mod contact;
pub mod inquiries;
pub mod tours;
pub mod users;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Tours
        .route("/tours", get(tours::list_tours).post(tours::create_tour))
        .route("/tours/draft/nights", post(tours::draft_nights))
        .route("/tours/draft/options", post(tours::draft_add_option))
        .route("/tours/draft/options/remove", post(tours::draft_remove_option))
        .route("/tours/draft/validate", post(tours::draft_validate))
        .route("/tours/images", post(tours::upload_images))
        .route(
            "/tours/:id",
            get(tours::get_tour)
                .put(tours::update_tour)
                .delete(tours::delete_tour),
        )
        .route("/tours/:id/quote", get(tours::quote_tour))
        // Inquiries
        .route(
            "/inquiries",
            get(inquiries::list_inquiries).post(inquiries::submit_inquiry),
        )
        .route("/inquiries/:id", delete(inquiries::delete_inquiry))
        .route("/inquiries/:id/reply", post(inquiries::reply_inquiry))
        // Contact form
        .route("/contact", post(contact::submit_contact))
        .route("/contact/inquiries", get(contact::list_contacts))
        .route("/contact/inquiries/:id", delete(contact::delete_contact))
        .route("/contact/inquiries/:id/reply", post(contact::reply_contact))
        // Users
        .route("/users/register", post(users::register))
        .with_state(state)
}

/// Liveness check with cache statistics
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::Config;

    fn app() -> Router {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost:1/unused".to_string()),
            "RATES_API_URL" => Some("http://127.0.0.1:9".to_string()),
            _ => None,
        })
        .unwrap();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        router(AppState::new(db, config))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache"]["tours_size"], 0);
    }

    #[tokio::test]
    async fn test_draft_validate_reports_every_field() {
        let (status, body) = post_json("/tours/draft/validate", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        for field in ["title", "price", "nights", "tour_summary", "tour_image", "first_day", "last_day"] {
            assert!(body["field_errors"].get(field).is_some(), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn test_draft_nights_extends_itinerary() {
        let (status, body) =
            post_json("/tours/draft/nights", json!({ "tour": {}, "nights": 3 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confirmed_nights"], "3");

        let days: Vec<u64> = body["itinerary"]["middle_days"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["day"].as_u64().unwrap())
            .collect();
        assert_eq!(days, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_draft_nights_rejects_zero() {
        let (status, body) =
            post_json("/tours/draft/nights", json!({ "tour": {}, "nights": 0 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"].get("nights").is_some());
    }

    #[tokio::test]
    async fn test_draft_nights_rejects_counts_above_limit() {
        let (status, body) =
            post_json("/tours/draft/nights", json!({ "tour": {}, "nights": 2_000_000_000i64 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"].get("nights").is_some());
    }

    #[tokio::test]
    async fn test_draft_option_requires_confirmed_nights() {
        let option = json!({ "label": "Water Villa", "add_price": 300, "old_add_price": 350 });
        let (status, body) =
            post_json("/tours/draft/options", json!({ "tour": {}, "option": option })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"].get("nights").is_some());
    }

    #[tokio::test]
    async fn test_upload_without_images_is_rejected() {
        let (status, body) = post_json("/tours/images", json!({ "images": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"].get("images").is_some());
    }

    #[tokio::test]
    async fn test_upload_reports_each_image() {
        // No upload key configured: every image fails on its own.
        let (status, body) =
            post_json("/tours/images", json!({ "images": ["aGVsbG8=", "%%%"] })).await;
        assert_eq!(status, StatusCode::OK);
        let results = body.as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["index"], 1);
        assert!(results.iter().all(|r| r.get("url").is_none()));
    }
}
