use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperdashError {
    #[error("unparsable timestamp '{0}'")]
    UnparsableTimestamp(String),

    #[error("feed decode error: {0}")]
    FeedDecode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PaperdashError>;
