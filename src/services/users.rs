use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::{CreateUserRequest, NewUser, Pagination, User, UserPage, UserWithRelations};
use crate::store::Store;

pub struct UsersService {
    store: Arc<dyn Store>,
}

impl UsersService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// One page of active users, newest first, with total count and page count.
    pub async fn list(&self, pagination: Pagination) -> Result<UserPage, AppError> {
        let users = self
            .store
            .list_users(pagination.offset(), pagination.limit)
            .await?;
        let count = self.store.count_users().await?;
        Ok(UserPage {
            users: self.with_relations(users).await?,
            count,
            total_pages: pagination.total_pages(count),
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<UserWithRelations, AppError> {
        let user = self.store.find_user_by_id(id).await?;
        self.single_with_relations(user).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<UserWithRelations, AppError> {
        let user = self.store.find_user_by_email(email).await?;
        self.single_with_relations(user).await
    }

    /// Registers a new account. The email must not be used by any account,
    /// deactivated ones included; the password is only ever stored hashed.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, AppError> {
        if self.store.email_taken(&request.email).await? {
            log::info!("rejected duplicate registration");
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .store
            .create_user(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                avatar: request.avatar,
                role: request.role.unwrap_or_default(),
            })
            .await?;

        log::info!("created user {}", user.id);
        Ok(user)
    }

    /// Replaces the password after checking the current one.
    pub async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<User, AppError> {
        let stored_hash = self
            .store
            .find_password_hash(id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if !verify_password(old_password, &stored_hash)? {
            return Err(AppError::BadRequest("Current password is invalid".into()));
        }

        let password_hash = hash_password(new_password)?;
        let user = self
            .store
            .update_password(id, &password_hash)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        log::info!("password changed for user {}", id);
        Ok(user)
    }

    /// Soft delete: the account is flagged inactive and disappears from reads.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.deactivate_user(id).await? {
            return Err(AppError::not_found("User"));
        }
        log::info!("deactivated user {}", id);
        Ok(())
    }

    /// Returns the user id when `password` matches the active account behind `email`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Uuid, AppError> {
        let invalid = || AppError::Unauthorized("Invalid credentials".into());
        let (id, stored_hash) = self
            .store
            .find_credentials_by_email(email)
            .await?
            .ok_or_else(invalid)?;

        if verify_password(password, &stored_hash)? {
            Ok(id)
        } else {
            Err(invalid())
        }
    }

    async fn single_with_relations(&self, user: Option<User>) -> Result<UserWithRelations, AppError> {
        let user = user.ok_or_else(|| AppError::not_found("User"))?;
        self.with_relations(vec![user])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Attaches relations with three reads for the whole batch, not per user.
    async fn with_relations(&self, users: Vec<User>) -> Result<Vec<UserWithRelations>, AppError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = users.iter().map(|user| user.id).collect();
        let tasks = self.store.list_tasks_assigned_to(&ids).await?;
        let collaborations = self.store.list_collaborations(&ids).await?;
        let projects = self.store.list_projects_created_by(&ids).await?;

        Ok(users
            .into_iter()
            .map(|user| UserWithRelations {
                assigned_tasks: tasks
                    .iter()
                    .filter(|task| task.assignee_id == Some(user.id))
                    .cloned()
                    .collect(),
                collaborations: collaborations
                    .iter()
                    .filter(|membership| membership.user_id == user.id)
                    .cloned()
                    .collect(),
                created_projects: projects
                    .iter()
                    .filter(|project| project.created_by_id == user.id)
                    .cloned()
                    .collect(),
                user,
            })
            .collect())
    }
}
