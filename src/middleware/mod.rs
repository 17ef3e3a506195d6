//! # Middleware Components
//!
//! Authentication and capability checks composed in front of protected routes.

pub mod auth;
pub mod capability;

pub use auth::{AuthUser, auth_middleware};
pub use capability::{BOT_MASTER, bot_master_guard, has_capability};
