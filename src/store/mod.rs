//! Persistence collaborator.
//!
//! Services and the resource guard only talk to storage through the [`Store`]
//! trait. [`postgres::PgStore`] is the production implementation on top of
//! `sqlx`; [`memory::MemoryStore`] keeps everything in process and backs the
//! test-suite and database-less local runs.
//!
//! Every method is a single statement against storage. Reads of users only see
//! active accounts, with the exception of [`UserStore::email_taken`], which
//! guards the unique email constraint.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Collaborator, CollaboratorRole, Comment, NewUser, Project, ProjectInput, Task, TaskInput,
    User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A single entity reference to check for existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    UserId(Uuid),
    UserEmail(String),
    Project(Uuid),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Active users, newest first.
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, AppError>;
    async fn count_users(&self) -> Result<i64, AppError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Whether any account, active or not, already uses `email`.
    async fn email_taken(&self, email: &str) -> Result<bool, AppError>;
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_password_hash(&self, id: Uuid) -> Result<Option<String>, AppError>;
    /// `(id, password_hash)` of the active account registered under `email`.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(Uuid, String)>, AppError>;
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, AppError>;
    /// Clears the `active` flag. Returns `false` when no active user matched.
    async fn deactivate_user(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;
    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError>;
    async fn create_project(
        &self,
        input: ProjectInput,
        created_by_id: Uuid,
    ) -> Result<Project, AppError>;
    async fn update_project(
        &self,
        id: Uuid,
        input: ProjectInput,
    ) -> Result<Option<Project>, AppError>;
    /// Removes the project with its tasks, comments and collaborators.
    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError>;
    async fn list_collaborators(&self, project_id: Uuid) -> Result<Vec<Collaborator>, AppError>;
    async fn find_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Collaborator>, AppError>;
    async fn add_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: CollaboratorRole,
    ) -> Result<Collaborator, AppError>;
    async fn remove_collaborator(&self, project_id: Uuid, user_id: Uuid)
        -> Result<bool, AppError>;
    /// Projects created by any of `user_ids`.
    async fn list_projects_created_by(&self, user_ids: &[Uuid]) -> Result<Vec<Project>, AppError>;
    /// Memberships held by any of `user_ids`.
    async fn list_collaborations(&self, user_ids: &[Uuid]) -> Result<Vec<Collaborator>, AppError>;
}

/// Task access. Single-task operations always take the owning project id too.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, AppError>;
    async fn find_task(&self, id: Uuid, project_id: Uuid) -> Result<Option<Task>, AppError>;
    async fn create_task(&self, task: Task) -> Result<Task, AppError>;
    async fn update_task(
        &self,
        id: Uuid,
        project_id: Uuid,
        input: TaskInput,
    ) -> Result<Option<Task>, AppError>;
    async fn delete_task(&self, id: Uuid, project_id: Uuid) -> Result<bool, AppError>;
    /// Tasks assigned to any of `user_ids`, across projects.
    async fn list_tasks_assigned_to(&self, user_ids: &[Uuid]) -> Result<Vec<Task>, AppError>;
}

/// Comment access, scoped by the owning task.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, AppError>;
    async fn create_comment(&self, comment: Comment) -> Result<Comment, AppError>;
    async fn update_comment(
        &self,
        id: Uuid,
        task_id: Uuid,
        content: String,
    ) -> Result<Option<Comment>, AppError>;
    async fn delete_comment(&self, id: Uuid, task_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait Store: UserStore + ProjectStore + TaskStore + CommentStore {
    /// One read that confirms the referenced entity exists.
    async fn exists(&self, lookup: &Lookup) -> Result<bool, AppError>;
}
