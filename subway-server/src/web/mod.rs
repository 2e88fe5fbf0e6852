//! Web layer for the station registry.
//!
//! Provides the `/stations` HTTP endpoints.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
