#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Domain models, persistence, services, authentication, the resource existence"]
#![doc = "guard and the webhook verifier behind the TaskBoard API. The binary (`main.rs`)"]
#![doc = "only reads configuration, picks a store and starts the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod webhook;

pub use crate::error::AppError;
pub use crate::state::AppState;
