use crate::{
    auth::{generate_token, AuthResponse, LoginRequest},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Login user
///
/// Exchanges an email and password for an access token.
///
/// ## Responses:
/// - `200 OK`: `{ "token": ..., "userId": ... }`.
/// - `400 Bad Request`: If the payload fails validation.
/// - `401 Unauthorized`: Unknown email, deactivated account or wrong password.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user_id = state
        .users
        .authenticate(&login_data.email, &login_data.password)
        .await?;
    let token = generate_token(user_id, &state.jwt_secret)?;

    Ok(HttpResponse::Ok().json(AuthResponse { token, user_id }))
}
