//! Domain services. Each one is a thin orchestrator over the [`Store`](crate::store::Store)
//! that adds the business rules lookups alone do not cover.

pub mod comments;
pub mod projects;
pub mod tasks;
pub mod users;

pub use comments::CommentsService;
pub use projects::ProjectsService;
pub use tasks::TasksService;
pub use users::UsersService;
