//! Product catalog service: paginated listing and CRUD over a single
//! `Product` resource, served with axum and stored through sqlx.

pub mod config;
pub mod database;
pub mod dtos;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
