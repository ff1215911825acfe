//! Sharestead item sharing server
//!
//! A REST JSON API for a peer-to-peer lending catalog: users list items
//! they own, book other users' items for a time window, comment on items
//! they have borrowed, and post open requests for items not yet listed.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
