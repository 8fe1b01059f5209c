//! Error types for the hospitalization data loader.
//!
//! - [`FetchError`] - Upstream HTTP errors
//! - [`SourceError`] - Local file source errors
//! - [`ConfigError`] - Invalid configuration values
//! - [`LoadError`] - Top-level load errors
//! - [`ServerError`] - HTTP API errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors while fetching the upstream CSV.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or no response arrived.
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The response body could not be read as text.
    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// =============================================================================
// Local Source Errors
// =============================================================================

/// Errors while reading a CSV from disk.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Delimiter must be a single character.
    #[error("Invalid delimiter '{0}': expected a single character")]
    InvalidDelimiter(String),

    /// National region name must not be empty.
    #[error("National region name must not be empty")]
    EmptyNationalRegion,
}

// =============================================================================
// Load Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::transform::pipeline::load`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// Upstream fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Local source failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration was invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Loading data for a request failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for local source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
