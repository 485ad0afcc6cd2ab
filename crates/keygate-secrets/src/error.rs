//! Error types for secret storage.

use thiserror::Error;

/// Status codes reported in [`StorageError::Failure`].
///
/// Apple backends report the native `OSStatus`; backends without numeric
/// statuses use the negative keygate-specific codes below.
pub mod codes {
    /// `errSecDuplicateItem`.
    pub const DUPLICATE_ITEM: i32 = -25299;
    /// `errSecItemNotFound`.
    pub const ITEM_NOT_FOUND: i32 = -25300;
    /// Generic platform failure.
    pub const PLATFORM_FAILURE: i32 = -1;
    /// The store is locked or access was denied.
    pub const NO_STORAGE_ACCESS: i32 = -2;
    /// The platform rejected an attribute or value.
    pub const INVALID_ATTRIBUTE: i32 = -3;
    /// The key index could not be parsed.
    pub const CORRUPT_INDEX: i32 = -4;
}

/// Status reported by a secure-storage backend.
///
/// `Ok(())` is success; this is the closed set of non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("duplicate item")]
    DuplicateItem,

    #[error("item not found")]
    ItemNotFound,

    #[error("storage failure (code {code}): {message}")]
    Failure { code: i32, message: String },
}

impl StorageError {
    /// Build a [`StorageError::Failure`].
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self::Failure {
            code,
            message: message.into(),
        }
    }

    /// Numeric status code.
    pub fn code(&self) -> i32 {
        match self {
            Self::DuplicateItem => codes::DUPLICATE_ITEM,
            Self::ItemNotFound => codes::ITEM_NOT_FOUND,
            Self::Failure { code, .. } => *code,
        }
    }
}

/// Errors surfaced by [`crate::SecretStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Encoding failed: value is not valid UTF-8")]
    EncodingFailed,

    #[error("Decoding failed: {0}")]
    DecodingFailed(#[from] std::string::FromUtf8Error),

    #[error("Secure storage error (code {code}): {message}")]
    Underlying { code: i32, message: String },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

impl StoreError {
    /// Underlying status code, if the error came from the backend.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Underlying { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        Self::Underlying {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Convenience result alias for secret store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
