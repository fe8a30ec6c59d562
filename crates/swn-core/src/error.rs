use crate::actor::ActorId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating actors and their possessions.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested actor ID does not exist in the roster.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// An actor with the same name already exists.
    #[error("actor already exists: \"{0}\"")]
    DuplicateName(String),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
