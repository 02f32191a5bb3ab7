pub mod events;
pub mod repository;
pub mod validation;

pub use events::EventPublisher;
pub use repository::OrderRepository;
pub use validation::validate_order;

/// Error type shared by storage adapters and publishers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

impl From<BoxError> for CoreError {
    fn from(err: BoxError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
