//! # SaaS Tools Digital common library
//!
//! Shared code for the content service:
//! - Error and result types
//! - Configuration loading (TOML bootstrap, env/CLI overrides)
//! - Database bootstrap and persisted record models
//! - Slug derivation for article lookup keys

pub mod config;
pub mod db;
pub mod error;
pub mod slug;
pub mod time;

pub use error::{Error, Result};
