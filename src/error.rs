use thiserror::Error;

#[derive(Error, Debug)]
pub enum PassbookError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Unsupported statement format: no parser recognised this file. \
         Supported banks: {banks}. For other layouts use `passbook import --columns <aliases.json>`"
    )]
    UnsupportedFormat { banks: String },

    #[error("No transactions found in {bank} statement")]
    EmptyResult { bank: String },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid column format: {0}")]
    InvalidFormat(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("{0}")]
    Other(String),
}

/// Stable classification of a [`PassbookError`], independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    EmptyResult,
    Database,
    Io,
    Csv,
    InvalidRule,
    InvalidFormat,
    UnknownCategory,
    Json,
    Other,
}

impl PassbookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) => ErrorKind::Database,
            Self::Io(_) => ErrorKind::Io,
            Self::Csv(_) => ErrorKind::Csv,
            Self::Json(_) => ErrorKind::Json,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::InvalidRule(_) => ErrorKind::InvalidRule,
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::UnknownCategory(_) => ErrorKind::UnknownCategory,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PassbookError>;
