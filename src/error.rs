use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No payment request with id {0}")]
    UnknownRequest(i64),

    #[error("No job posting with id {0}")]
    UnknownPosting(i64),

    #[error("No key result '{0}'")]
    UnknownKeyResult(String),

    #[error("Unknown pillar '{0}'")]
    UnknownPillar(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, OpsError>;
