pub mod comment;
pub mod pagination;
pub mod project;
pub mod task;
pub mod user;

pub use comment::{Comment, CommentInput};
pub use pagination::{PageQuery, Pagination};
pub use project::{
    AddCollaboratorRequest, Collaborator, CollaboratorRole, Project, ProjectInput,
    ProjectWithTasks,
};
pub use task::{Task, TaskInput, TaskPriority, TaskStatus};
pub use user::{
    ChangePasswordRequest, CreateUserRequest, NewUser, User, UserPage, UserRole, UserWithRelations,
};
