use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Fatal problems with the input file: the dataset cannot be used at all.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("column '{column}' has unexpected type: {detail}")]
    WrongType {
        column: &'static str,
        detail: String,
    },

    #[error("row {row}: {detail}")]
    BadValue { row: usize, detail: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("reading CSV")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),

    #[error("reading Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding Arrow data")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("reading file")]
    Io(#[from] std::io::Error),
}

/// A filter selection referenced a value outside the table's fixed domain.
///
/// Kept distinct from the legitimate "zero rows matched" outcome: an unknown
/// value means the UI and the table disagree, which should fail loudly
/// instead of silently rendering an empty dashboard.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {dimension} value '{value}'")]
pub struct FilterError {
    pub dimension: &'static str,
    pub value: String,
}
