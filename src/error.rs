use arrow_schema::ArrowError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Load Error: {0}")]
    Load(String),
    #[error("Lookup Error: {0}")]
    Lookup(String),
    #[error("Value Error: {0}")]
    Value(String),
    #[error("Command Error: {0}")]
    Command(String),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet Error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Logger Error: {0}")]
    Logger(String),
}

impl DashboardError {
    /// Errors that only spoil the current render pass and can be shown inline.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DashboardError::Lookup(_) | DashboardError::Value(_) | DashboardError::Command(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
