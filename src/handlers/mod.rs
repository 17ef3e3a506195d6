//! # HTTP Request Handlers
//!
//! ## Available Handlers
//!
//! - **Health Check** (`health_check`) - Liveness, readiness and operator ping

mod health_check;

pub use health_check::*;
