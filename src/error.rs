use thiserror::Error;

/// Errors raised while loading inputs or writing seating results.
///
/// The seating engine itself never fails; everything here comes from the
/// file-facing collaborators around it or from rejected configuration.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column {0:?} in {1}")]
    MissingColumn(String, &'static str),

    #[error("Table size must be at least 1 (got {0})")]
    InvalidTableSize(u32),

    #[error("Fuzzy cutoff must be between 0.0 and 1.0 (got {0})")]
    InvalidFuzzyCutoff(f64),

    #[error("Could not decode {0} as text")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
