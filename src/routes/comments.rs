use crate::{
    auth::AuthenticatedUserId, error::AppError, models::CommentInput, state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

#[get("")]
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id) = path.into_inner();
    let comments = state.comments.list(project_id, task_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Comments on a task as the authenticated user.
#[post("")]
pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    path: web::Path<(Uuid, Uuid)>,
    comment_data: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    comment_data.validate()?;
    let (project_id, task_id) = path.into_inner();

    let comment = state
        .comments
        .create(project_id, task_id, user.0, comment_data.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[put("/{id}")]
pub async fn update_comment(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
    comment_data: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    comment_data.validate()?;
    let (project_id, task_id, id) = path.into_inner();

    let comment = state
        .comments
        .update(project_id, task_id, id, comment_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[delete("/{id}")]
pub async fn delete_comment(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, task_id, id) = path.into_inner();
    state.comments.delete(project_id, task_id, id).await?;
    Ok(HttpResponse::NoContent().finish())
}
