//! Database bootstrap and persisted record models

pub mod init;
pub mod models;

pub use init::*;
pub use models::*;
