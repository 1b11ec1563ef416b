use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CommentStore, Lookup, ProjectStore, Store, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{
    Collaborator, CollaboratorRole, Comment, NewUser, Project, ProjectInput, Task, TaskInput,
    User,
};

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct Tables {
    users: Vec<StoredUser>,
    projects: Vec<Project>,
    collaborators: Vec<Collaborator>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
}

/// In-process store with the same constraints as the SQL schema: unique
/// emails, unique collaborator pairs and cascading deletes.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn active_user(&self, id: Uuid) -> Option<&StoredUser> {
        self.users
            .iter()
            .find(|stored| stored.user.id == id && stored.user.active)
    }

    fn active_user_mut(&mut self, id: Uuid) -> Option<&mut StoredUser> {
        self.users
            .iter_mut()
            .find(|stored| stored.user.id == id && stored.user.active)
    }

    fn active_user_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users
            .iter()
            .find(|stored| stored.user.email == email && stored.user.active)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .rev()
            .filter(|stored| stored.user.active)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().filter(|stored| stored.user.active).count() as i64)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.active_user(id).map(|stored| stored.user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .active_user_by_email(email)
            .map(|stored| stored.user.clone()))
    }

    async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|stored| stored.user.email == email))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|stored| stored.user.email == user.email) {
            return Err(AppError::Conflict("Resource already exists".into()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            role: user.role,
            active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        Ok(created)
    }

    async fn find_password_hash(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .active_user(id)
            .map(|stored| stored.password_hash.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(Uuid, String)>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .active_user_by_email(email)
            .map(|stored| (stored.user.id, stored.password_hash.clone())))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.active_user_mut(id).map(|stored| {
            stored.password_hash = password_hash.to_string();
            stored.user.updated_at = Utc::now();
            stored.user.clone()
        }))
    }

    async fn deactivate_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.active_user_mut(id) {
            Some(stored) => {
                stored.user.active = false;
                stored.user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().rev().cloned().collect())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create_project(
        &self,
        input: ProjectInput,
        created_by_id: Uuid,
    ) -> Result<Project, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|stored| stored.user.id == created_by_id) {
            return Err(AppError::BadRequest(
                "Referenced resource does not exist".into(),
            ));
        }
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_by_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        input: ProjectInput,
    ) -> Result<Option<Project>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.iter_mut().find(|p| p.id == id).map(|project| {
            project.name = input.name;
            project.description = input.description;
            project.updated_at = Utc::now();
            project.clone()
        }))
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        if tables.projects.len() == before {
            return Ok(false);
        }
        let task_ids: Vec<Uuid> = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == id)
            .map(|t| t.id)
            .collect();
        tables.comments.retain(|c| !task_ids.contains(&c.task_id));
        tables.tasks.retain(|t| t.project_id != id);
        tables.collaborators.retain(|c| c.project_id != id);
        Ok(true)
    }

    async fn list_collaborators(&self, project_id: Uuid) -> Result<Vec<Collaborator>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .collaborators
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Collaborator>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .collaborators
            .iter()
            .find(|c| c.project_id == project_id && c.user_id == user_id)
            .cloned())
    }

    async fn add_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: CollaboratorRole,
    ) -> Result<Collaborator, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .collaborators
            .iter()
            .any(|c| c.project_id == project_id && c.user_id == user_id)
        {
            return Err(AppError::Conflict("Resource already exists".into()));
        }
        let collaborator = Collaborator {
            project_id,
            user_id,
            role,
            created_at: Utc::now(),
        };
        tables.collaborators.push(collaborator.clone());
        Ok(collaborator)
    }

    async fn remove_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.collaborators.len();
        tables
            .collaborators
            .retain(|c| !(c.project_id == project_id && c.user_id == user_id));
        Ok(tables.collaborators.len() != before)
    }

    async fn list_projects_created_by(&self, user_ids: &[Uuid]) -> Result<Vec<Project>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| user_ids.contains(&p.created_by_id))
            .cloned()
            .collect())
    }

    async fn list_collaborations(&self, user_ids: &[Uuid]) -> Result<Vec<Collaborator>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .collaborators
            .iter()
            .filter(|c| user_ids.contains(&c.user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: Uuid, project_id: Uuid) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.project_id == project_id)
            .cloned())
    }

    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == task.project_id) {
            return Err(AppError::BadRequest(
                "Referenced resource does not exist".into(),
            ));
        }
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        id: Uuid,
        project_id: Uuid,
        input: TaskInput,
    ) -> Result<Option<Task>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.project_id == project_id)
            .map(|task| {
                task.apply(input);
                task.clone()
            }))
    }

    async fn delete_task(&self, id: Uuid, project_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|t| !(t.id == id && t.project_id == project_id));
        if tables.tasks.len() == before {
            return Ok(false);
        }
        tables.comments.retain(|c| c.task_id != id);
        Ok(true)
    }

    async fn list_tasks_assigned_to(&self, user_ids: &[Uuid]) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.assignee_id.map_or(false, |id| user_ids.contains(&id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: Comment) -> Result<Comment, AppError> {
        let mut tables = self.tables.write().await;
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        task_id: Uuid,
        content: String,
    ) -> Result<Option<Comment>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.task_id == task_id)
            .map(|comment| {
                comment.content = content;
                comment.updated_at = Utc::now();
                comment.clone()
            }))
    }

    async fn delete_comment(&self, id: Uuid, task_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables
            .comments
            .retain(|c| !(c.id == id && c.task_id == task_id));
        Ok(tables.comments.len() != before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn exists(&self, lookup: &Lookup) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(match lookup {
            Lookup::UserId(id) => tables.active_user(*id).is_some(),
            Lookup::UserEmail(email) => tables.active_user_by_email(email).is_some(),
            Lookup::Project(id) => tables.projects.iter().any(|p| p.id == *id),
        })
    }
}
