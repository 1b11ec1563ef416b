use std::sync::Arc;

use crate::services::{CommentsService, ProjectsService, TasksService, UsersService};
use crate::store::Store;
use crate::webhook::WebhookVerifier;

/// Everything a request needs, assembled once at startup and shared through
/// `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub users: UsersService,
    pub projects: ProjectsService,
    pub tasks: TasksService,
    pub comments: CommentsService,
    pub webhook: WebhookVerifier,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_secret: String, webhook_secret: Option<String>) -> Self {
        Self {
            users: UsersService::new(store.clone()),
            projects: ProjectsService::new(store.clone()),
            tasks: TasksService::new(store.clone()),
            comments: CommentsService::new(store.clone()),
            webhook: WebhookVerifier::new(webhook_secret),
            store,
            jwt_secret,
        }
    }
}
