// Errors reported by the engine.
use serde::Serialize;
use thiserror::Error;

use crate::logic::types::TournamentId;

// Failures of the external match store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("slot conflict: {0}")]
    Conflict(String),
    #[error("match store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    // Bad input, rejected before anything is computed.
    #[error("validation error: {0}")]
    Validation(String),
    // The read-through query or the persistence call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    // The forward day scan went past the configured horizon.
    #[error("no free slot for {pairing} within {days_scanned} days")]
    SlotsExhausted {
        pairing: String,
        days_scanned: u32,
    },
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("schedule generation already running for tournament {0}")]
    Busy(TournamentId),
}

impl From<sqlx::Error> for EngineError {
    fn from(error: sqlx::Error) -> Self {
        EngineError::Store(StoreError::Database(error))
    }
}

// Hosts usually pass errors on as plain text.
impl Serialize for EngineError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
