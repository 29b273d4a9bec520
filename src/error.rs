#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Read Error: {0}")]
    Read(#[source] std::io::Error),
    #[error("Write Error: {0}")]
    Write(#[source] std::io::Error),
    #[error("Parse Error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("PDF Error: {0}")]
    Pdf(String),
    #[error("Empty Dataset: no records to derive a CSV header from for {0}")]
    EmptyDataset(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
