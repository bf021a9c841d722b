use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by catalog lookups.
///
/// `NotFound` is the only failure the route-synchronized modal handles
/// specifically; everything else is treated as a network failure.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The requested name has no catalog entry
    #[error("Pokemon not found in catalog: {0}")]
    NotFound(String),
    /// The catalog answered with a non-success status other than 404
    #[error("Catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    /// The request never produced a response
    #[error("Catalog request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The response body did not match the catalog schema
    #[error("Malformed catalog data: {0}")]
    Decode(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

/// Errors related to the persisted favorites set
#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("Failed to access favorites file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed favorites data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors related to loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("Invalid config value for {field}: {details}")]
    Invalid { field: &'static str, details: String },
}

/// Errors returned by the client side of the biography service
#[derive(Error, Debug)]
pub enum BioError {
    #[error("Biography request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Biography service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },
}

/// Errors raised while generating a biography upstream (proxy side)
#[derive(Error, Debug)]
pub enum BioGenerationError {
    /// The upstream credential is not configured
    #[error("GEMINI_API_KEY is not configured")]
    MissingCredential,
    #[error("Upstream model request failed: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for BioGenerationError {
    fn from(err: reqwest::Error) -> Self {
        BioGenerationError::Upstream(err.to_string())
    }
}

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Type alias for Results using FavoritesError
pub type FavoritesResult<T> = Result<T, FavoritesError>;

/// Type alias for Results using ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
