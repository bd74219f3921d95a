use thiserror::Error;

/// A persisted session could not be turned back into a live engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("corrupt saved session: {0}")]
    Corrupt(String),
}
