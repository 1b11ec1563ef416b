use crate::{error::AppError, models::TaskInput, state::AppState};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists the tasks of a project.
///
/// ## Path Parameters:
/// - `projectId`: The UUID of the owning project.
///
/// ## Responses:
/// - `200 OK`: A JSON array of `Task` objects.
/// - `401 Unauthorized`: Missing or invalid access token.
/// - `404 Not Found`: If the project does not exist.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(project_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task inside the project named by the URL.
///
/// ## Request Body:
/// A JSON object matching `TaskInput`:
/// - `title`: 1 to 200 characters.
/// - `description` (optional): Up to 1000 characters.
/// - `status` (optional): `TODO`, `IN_PROGRESS` or `DONE`. Defaults to `TODO`.
/// - `priority` (optional): `LOW`, `MEDIUM` or `HIGH`. Defaults to `MEDIUM`.
/// - `dueDate` (optional): RFC 3339 timestamp.
/// - `assigneeId` (optional): UUID of an active user.
///
/// ## Responses:
/// - `201 Created`: The new `Task`.
/// - `400 Bad Request`: Validation failure or unknown assignee.
/// - `404 Not Found`: If the project does not exist.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    project_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state
        .tasks
        .create(project_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a task by id within its project.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `404 Not Found`: If the task does not exist in this project.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, id) = path.into_inner();
    let task = state.tasks.find(id, project_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Overwrites a task. Omitted optional fields are cleared.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let (project_id, id) = path.into_inner();

    let task = state
        .tasks
        .update(id, project_id, task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (project_id, id) = path.into_inner();
    state.tasks.delete(id, project_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
