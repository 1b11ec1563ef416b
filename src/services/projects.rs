use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Collaborator, CollaboratorRole, Project, ProjectInput, ProjectWithTasks};
use crate::store::Store;

pub struct ProjectsService {
    store: Arc<dyn Store>,
}

impl ProjectsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Project>, AppError> {
        self.store.list_projects().await
    }

    /// The project with all of its tasks.
    pub async fn find_by_id(&self, id: Uuid) -> Result<ProjectWithTasks, AppError> {
        let project = self
            .store
            .find_project(id)
            .await?
            .ok_or_else(|| AppError::not_found("Project"))?;
        let tasks = self.store.list_tasks(id).await?;
        Ok(ProjectWithTasks { project, tasks })
    }

    pub async fn create(&self, input: ProjectInput, created_by_id: Uuid) -> Result<Project, AppError> {
        let project = self.store.create_project(input, created_by_id).await?;
        log::info!("user {} created project {}", created_by_id, project.id);
        Ok(project)
    }

    pub async fn update(&self, id: Uuid, input: ProjectInput) -> Result<Project, AppError> {
        self.store
            .update_project(id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Project"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_project(id).await? {
            return Err(AppError::not_found("Project"));
        }
        log::info!("deleted project {}", id);
        Ok(())
    }

    pub async fn list_collaborators(&self, project_id: Uuid) -> Result<Vec<Collaborator>, AppError> {
        self.store.list_collaborators(project_id).await
    }

    /// Adds `user_id` to the project. The user must be active and not already a member.
    pub async fn add_collaborator(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: CollaboratorRole,
    ) -> Result<Collaborator, AppError> {
        if self.store.find_user_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found("User"));
        }
        if self
            .store
            .find_collaborator(project_id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("User is already a collaborator".into()));
        }

        let collaborator = self.store.add_collaborator(project_id, user_id, role).await?;
        log::info!("added user {} to project {}", user_id, project_id);
        Ok(collaborator)
    }

    pub async fn remove_collaborator(&self, project_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if !self.store.remove_collaborator(project_id, user_id).await? {
            return Err(AppError::not_found("Collaborator"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Task, TaskInput, TaskPriority, TaskStatus, UserRole};
    use crate::store::{MemoryStore, TaskStore, UserStore};

    async fn setup() -> (ProjectsService, Arc<MemoryStore>, Uuid) {
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
        (ProjectsService::new(store.clone()), store, user.id)
    }

    fn input(name: &str) -> ProjectInput {
        ProjectInput {
            name: name.to_string(),
            description: Some("This project is about...".to_string()),
        }
    }

    #[actix_rt::test]
    async fn test_create_records_the_creator() {
        let (projects, _, user_id) = setup().await;
        let project = projects.create(input("Project 1"), user_id).await.unwrap();

        assert_eq!(project.created_by_id, user_id);
        assert_eq!(projects.list().await.unwrap(), vec![project]);
    }

    #[actix_rt::test]
    async fn test_find_by_id_includes_tasks() {
        let (projects, store, user_id) = setup().await;
        let project = projects.create(input("Project 1"), user_id).await.unwrap();
        let other = projects.create(input("Project 2"), user_id).await.unwrap();
        for (project_id, title) in [(project.id, "Write docs"), (other.id, "Ship it")] {
            store
                .create_task(Task::new(
                    TaskInput {
                        title: title.to_string(),
                        description: None,
                        status: TaskStatus::Todo,
                        priority: TaskPriority::Low,
                        due_date: None,
                        assignee_id: None,
                    },
                    project_id,
                ))
                .await
                .unwrap();
        }

        let found = projects.find_by_id(project.id).await.unwrap();
        assert_eq!(found.project.id, project.id);
        assert_eq!(found.tasks.len(), 1);
        assert_eq!(found.tasks[0].title, "Write docs");

        assert!(matches!(
            projects.find_by_id(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[actix_rt::test]
    async fn test_update_and_delete_unknown_project() {
        let (projects, _, _) = setup().await;
        assert!(matches!(
            projects.update(Uuid::new_v4(), input("x")).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            projects.delete(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[actix_rt::test]
    async fn test_collaborator_lifecycle() {
        let (projects, _, user_id) = setup().await;
        let project = projects.create(input("Project 1"), user_id).await.unwrap();

        let added = projects
            .add_collaborator(project.id, user_id, CollaboratorRole::Editor)
            .await
            .unwrap();
        assert_eq!(added.role, CollaboratorRole::Editor);

        let err = projects
            .add_collaborator(project.id, user_id, CollaboratorRole::Viewer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == "User is already a collaborator"));
        assert_eq!(projects.list_collaborators(project.id).await.unwrap().len(), 1);

        projects.remove_collaborator(project.id, user_id).await.unwrap();
        assert!(projects.list_collaborators(project.id).await.unwrap().is_empty());

        let err = projects
            .remove_collaborator(project.id, user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Collaborator not found"));
    }

    #[actix_rt::test]
    async fn test_deactivated_collaborator_can_be_removed() {
        let (projects, store, user_id) = setup().await;
        let project = projects.create(input("Project 1"), user_id).await.unwrap();
        projects
            .add_collaborator(project.id, user_id, CollaboratorRole::Viewer)
            .await
            .unwrap();
        assert!(store.deactivate_user(user_id).await.unwrap());

        projects.remove_collaborator(project.id, user_id).await.unwrap();
        assert!(projects.list_collaborators(project.id).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_unknown_collaborator_user() {
        let (projects, _, user_id) = setup().await;
        let project = projects.create(input("Project 1"), user_id).await.unwrap();

        let err = projects
            .add_collaborator(project.id, Uuid::new_v4(), CollaboratorRole::Viewer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "User not found"));
    }
}
