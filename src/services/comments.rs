use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Comment, CommentInput};
use crate::store::Store;

/// Comments hang off a task, which is itself resolved inside its project
/// before any comment is touched.
pub struct CommentsService {
    store: Arc<dyn Store>,
}

impl CommentsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, project_id: Uuid, task_id: Uuid) -> Result<Vec<Comment>, AppError> {
        self.resolve_task(project_id, task_id).await?;
        self.store.list_comments(task_id).await
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        author_id: Uuid,
        input: CommentInput,
    ) -> Result<Comment, AppError> {
        self.resolve_task(project_id, task_id).await?;
        self.store
            .create_comment(Comment::new(input, task_id, author_id))
            .await
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        id: Uuid,
        input: CommentInput,
    ) -> Result<Comment, AppError> {
        self.resolve_task(project_id, task_id).await?;
        self.store
            .update_comment(id, task_id, input.content)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))
    }

    pub async fn delete(&self, project_id: Uuid, task_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.resolve_task(project_id, task_id).await?;
        if !self.store.delete_comment(id, task_id).await? {
            return Err(AppError::not_found("Comment"));
        }
        Ok(())
    }

    async fn resolve_task(&self, project_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        self.store
            .find_task(task_id, project_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Task"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, ProjectInput, Task, TaskInput, TaskPriority, TaskStatus, UserRole};
    use crate::store::{MemoryStore, ProjectStore, TaskStore, UserStore};

    async fn setup() -> (CommentsService, Uuid, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser {
                name: "John Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                password_hash: "$2b$10$unused".to_string(),
                avatar: None,
                role: UserRole::User,
            })
            .await
            .unwrap();
        let project = store
            .create_project(
                ProjectInput {
                    name: "Project 1".to_string(),
                    description: None,
                },
                user.id,
            )
            .await
            .unwrap();
        let task = store
            .create_task(Task::new(
                TaskInput {
                    title: "Write docs".to_string(),
                    description: None,
                    status: TaskStatus::Todo,
                    priority: TaskPriority::Medium,
                    due_date: None,
                    assignee_id: None,
                },
                project.id,
            ))
            .await
            .unwrap();
        (CommentsService::new(store), user.id, project.id, task.id)
    }

    fn input(content: &str) -> CommentInput {
        CommentInput {
            content: content.to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_comment_lifecycle() {
        let (comments, user_id, project_id, task_id) = setup().await;

        let comment = comments
            .create(project_id, task_id, user_id, input("Looks good"))
            .await
            .unwrap();
        assert_eq!(comment.author_id, user_id);
        assert_eq!(comment.task_id, task_id);

        let updated = comments
            .update(project_id, task_id, comment.id, input("Looks great"))
            .await
            .unwrap();
        assert_eq!(updated.content, "Looks great");

        assert_eq!(comments.list(project_id, task_id).await.unwrap(), vec![updated]);

        comments.delete(project_id, task_id, comment.id).await.unwrap();
        assert!(comments.list(project_id, task_id).await.unwrap().is_empty());

        let err = comments
            .delete(project_id, task_id, comment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Comment not found"));
    }

    #[actix_rt::test]
    async fn test_task_must_belong_to_the_project() {
        let (comments, user_id, _, task_id) = setup().await;
        let foreign_project = Uuid::new_v4();

        let err = comments
            .create(foreign_project, task_id, user_id, input("Looks good"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Task not found"));

        assert!(comments.list(foreign_project, task_id).await.is_err());
    }
}
