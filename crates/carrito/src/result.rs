//! Result and error types for Carrito.

use thiserror::Error;

/// Result type for Carrito operations
pub type CarritoResult<T> = Result<T, CarritoError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum CarritoError {
    /// Requested browser kind is not in the supported set
    #[error("unsupported browser kind '{requested}', supported kinds are: {supported}")]
    Configuration {
        /// The invalid input
        requested: String,
        /// Comma-separated enumeration of the supported set
        supported: String,
    },

    /// A session-dependent operation ran with no Active session
    #[error("session is not initialized; call SessionManager::initialize first")]
    SessionNotInitialized,

    /// A wait primitive exceeded its bound
    #[error("timed out after {ms}ms waiting for element {locator}")]
    ElementTimeout {
        /// Locator that never became ready
        locator: String,
        /// Timeout bound in milliseconds
        ms: u64,
    },

    /// Session launch failed
    #[error("failed to launch browser session: {message}")]
    SessionLaunch {
        /// Error message
        message: String,
    },

    /// Driver-level failure during an element operation
    #[error("driver error on {locator}: {message}")]
    Driver {
        /// Locator the operation targeted
        locator: String,
        /// Error message
        message: String,
    },

    /// Navigation failed
    #[error("navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Screenshot capture failed
    #[error("screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// A locator template could not be rendered
    #[error("invalid locator template '{pattern}': {message}")]
    Template {
        /// The offending pattern
        pattern: String,
        /// What was wrong with it
        message: String,
    },

    /// Test-data file was malformed or missing a key
    #[error("test data error: {message}")]
    TestData {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
