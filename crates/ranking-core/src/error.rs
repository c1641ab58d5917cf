use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankingError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("External source error: {0}")]
    External(String),
}
