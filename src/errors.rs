//! Unified error type for the inventory back end.
//!
//! Database services return [`Result`](crate::errors::Result); the pure scheduling and history modules
//! never fail and do not use this type.

use thiserror::Error;

/// Every error the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read, parsed or applied
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input rejected before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// Which input was rejected and why
        message: String,
    },

    /// No active asset exists with this id
    #[error("Asset not found: {id}")]
    AssetNotFound {
        /// The requested asset id
        id: i64,
    },

    /// No maintenance item exists with this id
    #[error("Maintenance item not found: {id}")]
    MaintenanceItemNotFound {
        /// The requested maintenance item id
        id: i64,
    },

    /// Error bubbled up from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Snapshot or stored JSON could not be (de)serialised
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure, usually while reading the configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment variable holds a value that is not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
