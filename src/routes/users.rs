use crate::{
    error::AppError,
    guard::{EntityKind, ResourceGuard},
    models::{ChangePasswordRequest, CreateUserRequest, PageQuery, Pagination},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists active users, newest first.
///
/// ## Query Parameters:
/// - `page` (optional): 1-based page number, defaults to 1.
/// - `limit` (optional): Page size, defaults to 10 and is capped at 100.
///
/// ## Responses:
/// - `200 OK`: `{ "users": [...], "count": n, "totalPages": n }`, each user with
///   its relations.
#[get("")]
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let page = state.users.list(Pagination::from(&*query)).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// An active user with `assignedTasks`, `collaborations` and `createdProjects`.
#[get("/{id}", wrap = "ResourceGuard::new().require(\"id\", EntityKind::User)")]
pub async fn find_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = state.users.find_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get(
    "/email/{email}",
    wrap = "ResourceGuard::new().require(\"email\", EntityKind::UserEmail)"
)]
pub async fn find_user_by_email(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let user = state.users.find_by_email(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Registers a new user.
///
/// ## Responses:
/// - `201 Created`: The new user, without any password material.
/// - `400 Bad Request`: If the payload fails validation.
/// - `409 Conflict`: If the email is already registered.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    user_data: web::Json<CreateUserRequest>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;

    let user = state.users.create(user_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Replaces a user's password after checking the current one.
///
/// ## Responses:
/// - `200 OK`: The updated user.
/// - `400 Bad Request`: Validation failure or wrong current password.
/// - `404 Not Found`: Unknown or deactivated user.
#[patch(
    "/change-password/{id}",
    wrap = "ResourceGuard::new().require(\"id\", EntityKind::User)"
)]
pub async fn change_password(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    passwords: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    passwords.validate()?;

    let user = state
        .users
        .change_password(
            path.into_inner(),
            &passwords.old_password,
            &passwords.new_password,
        )
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete(
    "/deactivate/{id}",
    wrap = "ResourceGuard::new().require(\"id\", EntityKind::User)"
)]
pub async fn deactivate_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    state.users.deactivate(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
