//! Web layer for the geocoding and routing server.
//!
//! Provides HTTP endpoints for geocoding addresses and calculating routes.

mod dto;
mod routes;
mod server;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use server::{serve, shutdown_signal};
pub use state::AppState;
