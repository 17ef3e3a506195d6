//! # Utility Modules
//!
//! - **Constants** (`constant`) - Defaults and fixed limits
//! - **Secrets** (`secret`) - Reading secrets from files or the environment

pub mod constant;
pub mod secret;
