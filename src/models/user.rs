use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{Collaborator, Project, Task};

/// Account role. Corresponds to the `user_role` SQL enum.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// A user account as returned by the API.
///
/// Carries no password field: the stored hash is only reachable
/// through `UserStore::find_password_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    /// `false` once the account has been deactivated (soft delete).
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /v1/users`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
    #[validate(length(min = 1, max = 512))]
    pub avatar: Option<String>,
    pub role: Option<UserRole>,
}

/// A user ready to be persisted. Only ever carries the hashed password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub role: UserRole,
}

/// Payload for `PATCH /v1/users/change-password/{id}`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 6, max = 72))]
    pub new_password: String,
}

/// A user as returned by the read endpoints: the account plus the tasks
/// assigned to it, its project memberships and the projects it created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRelations {
    #[serde(flatten)]
    pub user: User,
    pub assigned_tasks: Vec<Task>,
    pub collaborations: Vec<Collaborator>,
    pub created_projects: Vec<Project>,
}

/// One page of the user listing.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<UserWithRelations>,
    pub count: i64,
    pub total_pages: i64,
}
