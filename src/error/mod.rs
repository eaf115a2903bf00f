use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Domain store errors surfaced to callers as human-readable messages.
///
/// These are validation/authorization failures only; none of them mark
/// a corrupted store, and none of them leave persisted state modified.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An account with this email already exists.")]
    DuplicateEmail,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("You must be signed in to do that.")]
    NotAuthenticated,

    #[error("Claim not found: {claim_id}")]
    ClaimNotFound { claim_id: String },
}

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to prepare store directory: {message}")]
    Directory { message: String },

    #[error("Failed to write store: {message}")]
    Write { message: String },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Call-request relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Relay API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid relay response: {message}")]
    InvalidResponse { message: String },

    #[error("Relay request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Claim-assistant boundary errors
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Assistant API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid assistant response: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for domain store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Result type alias for assistant operations
pub type AssistantResult<T> = Result<T, AssistantError>;
