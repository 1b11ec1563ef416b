use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    guard::{EntityKind, ResourceGuard},
    models::{AddCollaboratorRequest, ProjectInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

#[get("")]
pub async fn list_projects(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let projects = state.projects.list().await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Creates a project owned by the caller.
///
/// `createdById` is always the authenticated user; the body cannot set it.
///
/// ## Responses:
/// - `201 Created`: The new project.
/// - `400 Bad Request`: If the payload fails validation.
/// - `401 Unauthorized`: Missing or invalid access token.
#[post("")]
pub async fn create_project(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    project_data: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = state
        .projects
        .create(project_data.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::Created().json(project))
}

/// Fetches a project together with its tasks.
#[get(
    "/{projectId}",
    wrap = "ResourceGuard::new().require(\"projectId\", EntityKind::Project)"
)]
pub async fn get_project(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = state.projects.find_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[put(
    "/{projectId}",
    wrap = "ResourceGuard::new().require(\"projectId\", EntityKind::Project)"
)]
pub async fn update_project(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    project_data: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = state
        .projects
        .update(path.into_inner(), project_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Deletes a project along with its tasks, comments and collaborators.
#[delete(
    "/{projectId}",
    wrap = "ResourceGuard::new().require(\"projectId\", EntityKind::Project)"
)]
pub async fn delete_project(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    state.projects.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("")]
pub async fn list_collaborators(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let collaborators = state.projects.list_collaborators(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(collaborators))
}

/// Adds an existing user to the project.
///
/// ## Responses:
/// - `201 Created`: The new membership.
/// - `404 Not Found`: Unknown project or user.
/// - `409 Conflict`: The user is already a collaborator.
#[post("")]
pub async fn add_collaborator(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    request: web::Json<AddCollaboratorRequest>,
) -> Result<impl Responder, AppError> {
    let request = request.into_inner();
    let collaborator = state
        .projects
        .add_collaborator(path.into_inner(), request.user_id, request.role)
        .await?;
    Ok(HttpResponse::Created().json(collaborator))
}

/// Removes a user from the project.
///
/// The membership row decides: a collaborator whose account was deactivated
/// can still be removed.
///
/// ## Responses:
/// - `204 No Content`: The membership was removed.
/// - `404 Not Found`: Unknown project, or the user is not a collaborator.
#[delete("/{userId}")]
pub async fn remove_collaborator(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, user_id) = path.into_inner();
    state
        .projects
        .remove_collaborator(project_id, user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
