//! # Services
//!
//! Collaborators that the HTTP handlers and middleware depend on.
//!
//! ## Available Services
//!
//! - **Database** (`database`) - Connectivity probing against the backing database
//! - **JWT** (`jwt`) - Access token issuance and validation

pub mod database;
pub mod jwt;
