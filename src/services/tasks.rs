use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskInput};
use crate::store::Store;

/// Tasks are always addressed through their project: a task id paired with
/// the wrong project is reported as missing.
pub struct TasksService {
    store: Arc<dyn Store>,
}

impl TasksService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, project_id: Uuid) -> Result<Vec<Task>, AppError> {
        self.store.list_tasks(project_id).await
    }

    pub async fn find(&self, id: Uuid, project_id: Uuid) -> Result<Task, AppError> {
        self.store
            .find_task(id, project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))
    }

    pub async fn create(&self, project_id: Uuid, input: TaskInput) -> Result<Task, AppError> {
        self.check_assignee(input.assignee_id).await?;
        let task = self.store.create_task(Task::new(input, project_id)).await?;
        log::info!("created task {} in project {}", task.id, project_id);
        Ok(task)
    }

    pub async fn update(&self, id: Uuid, project_id: Uuid, input: TaskInput) -> Result<Task, AppError> {
        self.check_assignee(input.assignee_id).await?;
        self.store
            .update_task(id, project_id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))
    }

    pub async fn delete(&self, id: Uuid, project_id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_task(id, project_id).await? {
            return Err(AppError::not_found("Task"));
        }
        log::info!("deleted task {} from project {}", id, project_id);
        Ok(())
    }

    async fn check_assignee(&self, assignee_id: Option<Uuid>) -> Result<(), AppError> {
        match assignee_id {
            Some(id) if self.store.find_user_by_id(id).await?.is_none() => {
                Err(AppError::BadRequest("Assignee not found".into()))
            }
            _ => Ok(()),
        }
    }
}
