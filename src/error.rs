//! Error types for embedding-model wiring and client operations.
//!
//! The main error type is [`EmbedError`], which covers all failure modes:
//! - Configuration errors (missing connection fields, invalid settings)
//! - Request failures (network issues, provider errors)
//! - Rate limiting and timeouts
//! - Authentication failures
//!
//! Configuration errors are fatal at startup: the composition root propagates
//! them and aborts instead of registering a half-configured model. Skipped
//! registrations are *not* errors and never surface here.
//!
//! # Result Type
//!
//! Use [`EmbedResult<T>`] as a convenient alias for `Result<T, EmbedError>`:
//!
//! ```rust
//! use embedwire::EmbedResult;
//!
//! fn my_function() -> EmbedResult<String> {
//!     Ok("Success".to_string())
//! }
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
///
/// Use [`EmbedError::category()`] to get the category for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// External service failures (embedding providers, network issues).
    ///
    /// The provider or network had an issue. May be transient or indicate
    /// a provider outage.
    External,

    /// Client errors (invalid input, authentication, configuration).
    ///
    /// The caller made a mistake that they can fix (wrong API key,
    /// empty base URL, etc.).
    Client,

    /// Temporary failures that should be retried.
    ///
    /// Rate limits, timeouts, and other transient issues. Retry with
    /// exponential backoff.
    Transient,
}

/// Severity level for logging and alerting decisions.
///
/// Use [`EmbedError::severity()`] to get the severity for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Action failed but system is stable.
    ///
    /// Should be logged and investigated but not urgent.
    Error,

    /// Unexpected but recoverable situation.
    ///
    /// Worth logging for monitoring but may not require action.
    Warning,
}

// ============================================================================
// Embed error types
// ============================================================================

/// Convenient result type for embedding operations.
pub type EmbedResult<T> = std::result::Result<T, EmbedError>;

/// Errors that can occur during embedding-model wiring and requests.
///
/// Each variant includes relevant context and can be:
/// - Categorized via [`category()`](Self::category)
/// - Assessed for severity via [`severity()`](Self::severity)
/// - Checked for retryability via [`is_retryable()`](Self::is_retryable)
/// - Converted to user-friendly messages via [`user_message()`](Self::user_message)
///
/// # Creating Errors
///
/// Use the constructor methods which automatically log the error:
///
/// ```rust
/// use embedwire::EmbedError;
///
/// let err = EmbedError::configuration_error("Missing API key");
/// let err = EmbedError::rate_limit_exceeded(60);
/// let err = EmbedError::timeout(30);
/// ```
#[derive(Error, Debug)]
pub enum EmbedError {
    /// The requested embedding provider is not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider {
        /// The provider name that was requested.
        provider: String,
    },

    /// Connection or feature configuration is invalid or incomplete.
    ///
    /// Common causes:
    /// - Base URL and API key both unresolvable from any configuration level
    /// - Empty endpoint paths passed to the client builder
    /// - Header values that are not valid HTTP header content
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The HTTP request to the provider failed.
    ///
    /// This is a general failure that may be retryable. Check the source
    /// error for more details about the underlying cause.
    #[error("Request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse the provider's response.
    ///
    /// The provider returned a response, but it couldn't be parsed.
    /// This might indicate a provider API change or malformed response.
    #[error("Response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// Provider rate limit exceeded.
    ///
    /// The provider is throttling requests. Wait the indicated time
    /// before retrying.
    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded {
        /// Recommended wait time before retrying.
        retry_after_seconds: u64,
    },

    /// Request timed out.
    ///
    /// The provider didn't respond within the configured timeout.
    #[error("Request timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout_seconds: u64,
    },

    /// Authentication with the provider failed.
    ///
    /// Check the resolved API key. Not retryable without fixing the
    /// credential.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Details about the authentication failure.
        message: String,
    },
}

impl EmbedError {
    /// Get the error category for routing and handling decisions.
    ///
    /// - `Client`: fix the configuration or request
    /// - `External`: provider issue, may need ops attention
    /// - `Transient`: retry with backoff
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedProvider { .. } => ErrorCategory::Client,
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::ResponseParsingError { .. } => ErrorCategory::External,
            Self::RateLimitExceeded { .. } => ErrorCategory::Transient,
            Self::Timeout { .. } => ErrorCategory::Transient,
            Self::AuthenticationFailed { .. } => ErrorCategory::Client,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedProvider { .. } => ErrorSeverity::Error,
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::ResponseParsingError { .. } => ErrorSeverity::Warning,
            Self::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::AuthenticationFailed { .. } => ErrorSeverity::Error,
        }
    }

    /// Whether this error is transient and should trigger a retry.
    ///
    /// Returns `true` for rate limits, timeouts, and general request
    /// failures (which may be network issues).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } | Self::RequestFailed { .. }
        )
    }

    /// Convert to a user-friendly message suitable for display.
    ///
    /// Returns a message that's safe to show to end users - technical
    /// details and internal information are stripped or generalized.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedProvider { .. } => {
                "The requested embedding provider is not supported".to_string()
            }
            Self::ConfigurationError { .. } => {
                "Embedding service configuration issue. Please check your settings".to_string()
            }
            Self::RequestFailed { .. } => {
                "Unable to communicate with embedding service. Please try again".to_string()
            }
            Self::ResponseParsingError { .. } => {
                "Received an invalid response from embedding service".to_string()
            }
            Self::RateLimitExceeded {
                retry_after_seconds,
            } => {
                format!("Service is busy. Please wait {retry_after_seconds} seconds and try again")
            }
            Self::Timeout { .. } => "Request timed out. Please try again".to_string(),
            Self::AuthenticationFailed { .. } => {
                "Authentication failed. Please check your credentials".to_string()
            }
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================
    //
    // These methods automatically log the error at the appropriate level.
    // Use them instead of constructing variants directly.

    /// Create an unsupported provider error (logs at ERROR level).
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        let provider = provider.into();
        log_error!(
            provider = %provider,
            error_type = "unsupported_provider",
            "Unsupported embedding provider requested"
        );
        Self::UnsupportedProvider { provider }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Embedding configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Embedding request execution failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Embedding response format invalid"
        );
        Self::ResponseParsingError { message }
    }

    pub fn rate_limit_exceeded(retry_after_seconds: u64) -> Self {
        log_warn!(
            error_type = "rate_limit_exceeded",
            retry_after_seconds = retry_after_seconds,
            "Embedding provider rate limit exceeded"
        );
        Self::RateLimitExceeded {
            retry_after_seconds,
        }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Embedding request timed out"
        );
        Self::Timeout { timeout_seconds }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            message = %message,
            "Embedding provider authentication failed"
        );
        Self::AuthenticationFailed { message }
    }
}
