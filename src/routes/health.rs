use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness check at the root of the versioned API.
#[get("")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "API is running!",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
