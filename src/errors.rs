//! Unified error type for the ledger, conversation and bot layers.

use thiserror::Error;

/// All failures that can surface from `FinanceBuddy` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file or environment could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any failure reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure (reading `config.toml`)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Amount is zero, negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Free-text input that does not satisfy a field rule
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the violated rule
        message: String,
    },

    /// Category id is unknown or owned by another user
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// Category id taken from the callback payload
        id: i64,
    },

    /// Savings goal id is unknown or owned by another user
    #[error("Savings goal not found: {id}")]
    GoalNotFound {
        /// Goal id taken from the callback payload
        id: i64,
    },

    /// The user already owns a category with this name
    #[error("Category '{name}' already exists")]
    DuplicateCategory {
        /// Offending category name
        name: String,
    },

    /// Reply text could not be assembled
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework failure
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Returns true for errors meaning "the selected entity no longer exists".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CategoryNotFound { .. } | Self::GoalNotFound { .. }
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
