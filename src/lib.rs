//! # Friendly Backend Library
//!
//! Friendly is a personal relationship-management backend: an authenticated
//! user keeps friends with their work details, groups them into friendlists,
//! tags both, schedules recurring events with reminders and attaches images.
//!
//! ## Architecture
//!
//! Handlers, services and repositories are layered in that order:
//! - **Axum** for HTTP routing and extraction
//! - **SQLx** over SQLite for persistence, every query scoped by `user_id`
//! - **Tokio** as the async runtime, with image work on the blocking pool
//! - **bcrypt** and **jsonwebtoken** for credentials and bearer sessions
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration (embedded defaults, file, environment)
//! - [`db`]: pool setup and idempotent schema creation
//! - [`error`]: the [`error::AppError`] type and its JSON envelope
//! - [`auth`]: password hashing and token issuing
//! - [`models`]: rows, payloads and composite read-models
//! - [`repository`]: SQL per entity, including the partial-update [`repository::FieldMask`]
//! - [`service`]: validation and domain rules, including the birthday event
//! - [`images`]: filesystem image store with resize-to-JPEG
//! - [`middleware`]: session check, request validation, security headers
//! - [`routes`]: HTTP handlers and [`routes::router`]
//! - [`state`]: shared application state

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

#[cfg(test)]
mod tests;
