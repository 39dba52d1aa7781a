use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not decode {0} as UTF-8 or CP949")]
    Decode(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("AI insight failed: {0}")]
    Insight(String),

    #[error("선택한 조건에 해당하는 데이터가 없습니다.")]
    NoMatchingData,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SpendError>;
