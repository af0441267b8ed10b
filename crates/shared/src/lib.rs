//! Shared types, errors, and configuration for Lastro.
//!
//! This crate provides common types used across all other crates:
//! - ERP code normalization for tolerant category/code comparison
//! - CPF/CNPJ document handling with mask tolerance
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
