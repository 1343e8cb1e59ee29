use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[cfg(feature = "tokio")]
    #[error("no tokio runtime is available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    #[error("execution context {0:?} is closed")]
    Closed(String),
}
