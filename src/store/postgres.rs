use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CommentStore, Lookup, ProjectStore, Store, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{
    Collaborator, CollaboratorRole, Comment, NewUser, Project, ProjectInput, Task, TaskInput,
    User,
};

/// `Store` implementation over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, avatar, role, active, created_at, updated_at
             FROM users WHERE active
             ORDER BY created_at DESC
             OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, avatar, role, active, created_at, updated_at
             FROM users WHERE id = $1 AND active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, avatar, role, active, created_at, updated_at
             FROM users WHERE email = $1 AND active",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password, avatar, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, name, email, avatar, role, active, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.avatar)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_password_hash(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let hash =
            sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1 AND active")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(hash)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(Uuid, String)>, AppError> {
        let credentials = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, password FROM users WHERE email = $1 AND active",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET password = $1, updated_at = NOW()
             WHERE id = $2 AND active
             RETURNING id, name, email, avatar, role, active, created_at, updated_at",
        )
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn deactivate_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE users SET active = FALSE, updated_at = NOW() WHERE id = $1 AND active")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, created_by_id, created_at, updated_at
             FROM projects ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, created_by_id, created_at, updated_at
             FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn create_project(
        &self,
        input: ProjectInput,
        created_by_id: Uuid,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, name, description, created_by_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, description, created_by_id, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(input.name)
        .bind(input.description)
        .bind(created_by_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        input: ProjectInput,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects SET name = $1, description = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING id, name, description, created_by_id, created_at, updated_at",
        )
        .bind(input.name)
        .bind(input.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError> {
        // Tasks, comments and collaborators go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_collaborators(&self, project_id: Uuid) -> Result<Vec<Collaborator>, AppError> {
        let collaborators = sqlx::query_as::<_, Collaborator>(
            "SELECT project_id, user_id, role, created_at
             FROM project_collaborators WHERE project_id = $1
             ORDER BY created_at",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(collaborators)
    }

    async fn find_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Collaborator>, AppError> {
        let collaborator = sqlx::query_as::<_, Collaborator>(
            "SELECT project_id, user_id, role, created_at
             FROM project_collaborators WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(collaborator)
    }

    async fn add_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: CollaboratorRole,
    ) -> Result<Collaborator, AppError> {
        let collaborator = sqlx::query_as::<_, Collaborator>(
            "INSERT INTO project_collaborators (project_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING project_id, user_id, role, created_at",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(collaborator)
    }

    async fn remove_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM project_collaborators WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_projects_created_by(&self, user_ids: &[Uuid]) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, created_by_id, created_at, updated_at
             FROM projects WHERE created_by_id = ANY($1)
             ORDER BY created_at DESC",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn list_collaborations(&self, user_ids: &[Uuid]) -> Result<Vec<Collaborator>, AppError> {
        let collaborators = sqlx::query_as::<_, Collaborator>(
            "SELECT project_id, user_id, role, created_at
             FROM project_collaborators WHERE user_id = ANY($1)
             ORDER BY created_at",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(collaborators)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, priority, due_date, project_id, assignee_id, created_at, updated_at
             FROM tasks WHERE project_id = $1
             ORDER BY created_at",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: Uuid, project_id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, priority, due_date, project_id, assignee_id, created_at, updated_at
             FROM tasks WHERE id = $1 AND project_id = $2",
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        let created = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, description, status, priority, due_date, project_id, assignee_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, title, description, status, priority, due_date, project_id, assignee_id, created_at, updated_at",
        )
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.due_date)
        .bind(task.project_id)
        .bind(task.assignee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_task(
        &self,
        id: Uuid,
        project_id: Uuid,
        input: TaskInput,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET title = $1, description = $2, status = $3, priority = $4, due_date = $5,
                 assignee_id = $6, updated_at = NOW()
             WHERE id = $7 AND project_id = $8
             RETURNING id, title, description, status, priority, due_date, project_id, assignee_id, created_at, updated_at",
        )
        .bind(input.title)
        .bind(input.description)
        .bind(input.status)
        .bind(input.priority)
        .bind(input.due_date)
        .bind(input.assignee_id)
        .bind(id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid, project_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks_assigned_to(&self, user_ids: &[Uuid]) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, priority, due_date, project_id, assignee_id, created_at, updated_at
             FROM tasks WHERE assignee_id = ANY($1)
             ORDER BY created_at",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, author_id, task_id, created_at, updated_at
             FROM comments WHERE task_id = $1
             ORDER BY created_at",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn create_comment(&self, comment: Comment) -> Result<Comment, AppError> {
        let created = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, content, author_id, task_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, content, author_id, task_id, created_at, updated_at",
        )
        .bind(comment.id)
        .bind(comment.content)
        .bind(comment.author_id)
        .bind(comment.task_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        task_id: Uuid,
        content: String,
    ) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $1, updated_at = NOW()
             WHERE id = $2 AND task_id = $3
             RETURNING id, content, author_id, task_id, created_at, updated_at",
        )
        .bind(content)
        .bind(id)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid, task_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND task_id = $2")
            .bind(id)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn exists(&self, lookup: &Lookup) -> Result<bool, AppError> {
        let query = match lookup {
            Lookup::UserId(id) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND active)",
                )
                .bind(*id)
            }
            Lookup::UserEmail(email) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND active)",
                )
                .bind(email.clone())
            }
            Lookup::Project(id) => {
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
                    .bind(*id)
            }
        };
        Ok(query.fetch_one(&self.pool).await?)
    }
}
