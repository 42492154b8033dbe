use crate::db::DbError;

/// Failures surfaced by the catalog, booking, review and recommendation
/// components.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The id is not a well-formed identity, so it cannot name any record.
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Movie not found: {0}")]
    MovieNotFound(String),
    #[error("Theater not found: {0}")]
    TheaterNotFound(String),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Store timed out")]
    StoreTimeout,
    #[error("Store error: {0}")]
    Store(DbError),
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidArgument(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidId(_) | CoreError::MovieNotFound(_) | CoreError::TheaterNotFound(_)
        )
    }
}

impl From<DbError> for CoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Timeout => CoreError::StoreTimeout,
            other => CoreError::Store(other),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
