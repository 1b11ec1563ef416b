use crate::{error::AppError, state::AppState, webhook::SIGNATURE_HEADER};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use serde_json::{json, Value};

/// Receives Linear webhook deliveries.
///
/// The body is taken raw so the signature is checked over exactly the bytes
/// that were sent. It is parsed only once the signature matches.
///
/// ## Responses:
/// - `200 OK`: `{ "received": true }`.
/// - `400 Bad Request`: Signed body that is not valid JSON.
/// - `401 Unauthorized`: Missing or wrong signature, unconfigured secret, or empty body.
#[post("/linear-listener")]
pub async fn linear_listener(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(err) = state.webhook.verify(signature, &body) {
        log::warn!("rejected Linear delivery: {}", err);
        return Err(err);
    }

    let event: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    log::info!(
        "Linear event received: type={} action={}",
        event["type"].as_str().unwrap_or("unknown"),
        event["action"].as_str().unwrap_or("unknown")
    );

    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}
