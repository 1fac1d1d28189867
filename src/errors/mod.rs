//! Error types for the Drive ownership transfer toolkit.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Result type for ownership transfer operations.
pub type DriveTransferResult<T> = Result<T, DriveTransferError>;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum DriveTransferError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Authorization error.
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Resource error.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Ownership transfer error.
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Quota error.
    #[error("Quota error: {0}")]
    Quota(#[from] QuotaError),

    /// Credential storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Server error.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Response error.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl DriveTransferError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        DriveTransferError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates an authentication error.
    pub fn authentication(msg: impl Into<String>) -> Self {
        DriveTransferError::Authentication(AuthenticationError::InvalidToken(msg.into()))
    }

    /// Creates an invalid-input request error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        DriveTransferError::Request(RequestError::ValidationError(msg.into()))
    }

    /// Creates a file-not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        DriveTransferError::Resource(ResourceError::FileNotFound(msg.into()))
    }

    /// Creates a permission-lookup error.
    pub fn permission_lookup(msg: impl Into<String>) -> Self {
        DriveTransferError::Transfer(TransferError::PermissionLookupFailed(msg.into()))
    }

    /// Creates a promotion-failed error.
    pub fn promotion_failed(msg: impl Into<String>) -> Self {
        DriveTransferError::Transfer(TransferError::PromotionFailed(msg.into()))
    }

    /// Creates a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        DriveTransferError::Storage(StorageError::Io(msg.into()))
    }

    /// Creates a rate limit error.
    pub fn rate_limit(msg: impl Into<String>) -> Self {
        DriveTransferError::Quota(QuotaError::UserRateLimitExceeded {
            message: msg.into(),
            retry_after: None,
        })
    }

    /// Creates a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        DriveTransferError::Network(NetworkError::ConnectionFailed(msg.into()))
    }

    /// Creates a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        DriveTransferError::Server(ServerError::InternalError(msg.into()))
    }

    /// Creates a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        DriveTransferError::Response(ResponseError::DeserializationError(msg.into()))
    }

    /// Returns true if the error is retryable by a caller.
    ///
    /// The protocol and the batch coordinator never retry; this classification
    /// is informational for callers embedding the crate.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DriveTransferError::Quota(QuotaError::UserRateLimitExceeded { .. })
                | DriveTransferError::Quota(QuotaError::ProjectRateLimitExceeded { .. })
                | DriveTransferError::Network(NetworkError::Timeout { .. })
                | DriveTransferError::Network(NetworkError::ConnectionFailed { .. })
                | DriveTransferError::Server(ServerError::InternalError { .. })
                | DriveTransferError::Server(ServerError::ServiceUnavailable { .. })
                | DriveTransferError::Server(ServerError::BadGateway { .. })
        )
    }

    /// Returns the retry delay hint if the API provided one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            DriveTransferError::Quota(QuotaError::UserRateLimitExceeded {
                retry_after, ..
            }) => *retry_after,
            DriveTransferError::Quota(QuotaError::ProjectRateLimitExceeded {
                retry_after,
                ..
            }) => *retry_after,
            DriveTransferError::Server(ServerError::ServiceUnavailable {
                retry_after, ..
            }) => *retry_after,
            _ => None,
        }
    }

    /// Returns the HTTP status code if applicable.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            DriveTransferError::Authentication(_) => Some(StatusCode::UNAUTHORIZED),
            DriveTransferError::Authorization(_) => Some(StatusCode::FORBIDDEN),
            DriveTransferError::Request(_) => Some(StatusCode::BAD_REQUEST),
            DriveTransferError::Resource(ResourceError::FileNotFound(_)) => {
                Some(StatusCode::NOT_FOUND)
            }
            DriveTransferError::Resource(ResourceError::PermissionNotFound(_)) => {
                Some(StatusCode::NOT_FOUND)
            }
            DriveTransferError::Quota(_) => Some(StatusCode::TOO_MANY_REQUESTS),
            DriveTransferError::Server(ServerError::InternalError(_)) => {
                Some(StatusCode::INTERNAL_SERVER_ERROR)
            }
            DriveTransferError::Server(ServerError::BadGateway(_)) => {
                Some(StatusCode::BAD_GATEWAY)
            }
            DriveTransferError::Server(ServerError::ServiceUnavailable { .. }) => {
                Some(StatusCode::SERVICE_UNAVAILABLE)
            }
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid credentials.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Missing environment variable.
    #[error("Missing environment variable: {0}")]
    MissingEnvironment(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Invalid token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Expired token.
    #[error("Expired token: {0}")]
    ExpiredToken(String),

    /// Refresh failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Invalid grant.
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    /// No stored credential for an account and no authorization flow configured.
    #[error("No credential for account {0} and no authorization flow configured")]
    NoCredential(String),
}

/// Authorization errors.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// Forbidden.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Insufficient permissions.
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    /// File not accessible.
    #[error("File not accessible: {0}")]
    FileNotAccessible(String),

    /// Domain policy.
    #[error("Domain policy violation: {0}")]
    DomainPolicy(String),
}

/// Request errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing parameter.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
}

/// Resource errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// File not found or not accessible with the source account.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Permission not found.
    #[error("Permission not found: {0}")]
    PermissionNotFound(String),
}

/// Ownership transfer protocol errors.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Listing the permission set failed.
    #[error("Permission lookup failed: {0}")]
    PermissionLookupFailed(String),

    /// The target permission could not be promoted to owner.
    #[error("Promotion failed: {0}")]
    PromotionFailed(String),

    /// The file reported no owners, which violates the Drive data model.
    #[error("File has no owner: {0}")]
    MissingOwner(String),
}

/// Quota errors.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// User rate limit exceeded.
    #[error("User rate limit exceeded: {message}")]
    UserRateLimitExceeded {
        /// Error message.
        message: String,
        /// Retry after duration.
        retry_after: Option<Duration>,
    },

    /// Project rate limit exceeded.
    #[error("Project rate limit exceeded: {message}")]
    ProjectRateLimitExceeded {
        /// Error message.
        message: String,
        /// Retry after duration.
        retry_after: Option<Duration>,
    },
}

/// Credential storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O failure reading or writing a token record.
    #[error("Token store I/O error: {0}")]
    Io(String),

    /// Token record could not be serialized or parsed.
    #[error("Token record serialization error: {0}")]
    Serialization(String),
}

/// Network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Internal error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Service unavailable.
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
        /// Retry after duration.
        retry_after: Option<Duration>,
    },

    /// Bad gateway.
    #[error("Bad gateway: {0}")]
    BadGateway(String),
}

/// Response errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Unexpected format.
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<TransportError> for DriveTransferError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => {
                DriveTransferError::Network(NetworkError::Timeout(msg))
            }
            TransportError::Network(msg) => {
                DriveTransferError::Network(NetworkError::ConnectionFailed(msg))
            }
            TransportError::Http(msg) => {
                DriveTransferError::Response(ResponseError::UnexpectedFormat(msg))
            }
        }
    }
}
