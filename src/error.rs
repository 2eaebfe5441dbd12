//! Error types for lifemap

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifemapError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Symbol {symbol} out of range at level {level}")]
    OutOfRange { level: usize, symbol: u8 },

    #[error("Address parse error: {0}")]
    Parse(String),

    #[error("Duplicate record at {origin}: {text:?}")]
    DuplicateRecord { origin: String, text: String },

    #[error("Record not found: {0}")]
    NotFound(i64),

    #[error("Timeframe arithmetic failed: {0}")]
    Timeframe(String),

    #[error("Birthdate not set")]
    BirthdateNotSet,

    #[error("Birthdate already set")]
    BirthdateAlreadySet,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LifemapError>;
