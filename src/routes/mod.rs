pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod webhooks;

use actix_cors::Cors;
use actix_web::{error, web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::guard::{EntityKind, ResourceGuard};

/// Mounts the whole API under `/v1`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .app_data(web::PathConfig::default().error_handler(path_error))
            .service(health::health)
            .service(webhooks::linear_listener)
            .service(web::scope("/auth").service(auth::login))
            .service(
                web::scope("/users")
                    .service(users::list_users)
                    .service(users::create_user)
                    .service(users::find_user_by_email)
                    .service(users::change_password)
                    .service(users::deactivate_user)
                    .service(users::find_user),
            )
            .service(
                web::scope("/projects")
                    .wrap(AuthMiddleware)
                    // Nested scopes first: a `/{projectId}/tasks` prefix would
                    // otherwise swallow the comment routes.
                    .service(
                        web::scope("/{projectId}/tasks/{taskId}/comments")
                            .wrap(project_guard())
                            .service(comments::list_comments)
                            .service(comments::create_comment)
                            .service(comments::update_comment)
                            .service(comments::delete_comment),
                    )
                    .service(
                        web::scope("/{projectId}/tasks")
                            .wrap(project_guard())
                            .service(tasks::list_tasks)
                            .service(tasks::create_task)
                            .service(tasks::get_task)
                            .service(tasks::update_task)
                            .service(tasks::delete_task),
                    )
                    .service(
                        web::scope("/{projectId}/collaborators")
                            .wrap(project_guard())
                            .service(projects::list_collaborators)
                            .service(projects::add_collaborator)
                            .service(projects::remove_collaborator),
                    )
                    .service(projects::list_projects)
                    .service(projects::create_project)
                    .service(projects::get_project)
                    .service(projects::update_project)
                    .service(projects::delete_project),
            ),
    );
}

/// CORS policy for the whole app. Wrap it last so it is the outermost layer
/// and decorates every response, rejections included.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

fn project_guard() -> ResourceGuard {
    ResourceGuard::new().require("projectId", EntityKind::Project)
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
}
