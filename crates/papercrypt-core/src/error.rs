use thiserror::Error;

pub type PaperResult<T> = Result<T, PaperError>;

#[derive(Debug, Error)]
pub enum PaperError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
