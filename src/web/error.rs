use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal Server Error")]
    Internal,
    #[error("Not Found: {0}")]
    NotFound(String),
}

impl From<askama::Error> for Error {
    fn from(e: askama::Error) -> Self {
        tracing::error!("Error rendering template: {e}");
        Error::Internal
    }
}
