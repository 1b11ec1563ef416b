#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::{self, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use taskboard::routes;
use taskboard::state::AppState;
use taskboard::store::MemoryStore;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const WEBHOOK_SECRET: &str = "lin_wh_integration_secret";

/// The full `/v1` API over a fresh in-memory store, behind the same CORS layer
/// the server uses.
pub async fn init_app() -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        JWT_SECRET.to_string(),
        Some(WEBHOOK_SECRET.to_string()),
    );
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::config)
            .wrap(routes::cors()),
    )
    .await
}

/// Sends `req` and returns the status with the JSON body (`Null` when empty).
///
/// A service-level `Err` is rendered the way the HTTP server would render it.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let response = match app.call(req).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(err) => err.error_response(),
    };
    let status = response.status();
    let bytes = body::to_bytes(response.into_body())
        .await
        .unwrap_or_default();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Registered user plus a token for it.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub async fn create_user<S, B>(app: &S, email: &str, password: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let req = test::TestRequest::post()
        .uri("/v1/users")
        .set_json(json!({
            "name": "Integration User",
            "email": email,
            "password": password
        }))
        .to_request();
    let (status, user) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {}", user);
    user
}

pub async fn register_and_login<S, B>(app: &S, email: &str) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let password = "Password123!";
    let user = create_user(app, email, password).await;

    let req = test::TestRequest::post()
        .uri("/v1/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert_eq!(body["userId"], user["id"]);

    TestUser {
        id: user["id"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}
