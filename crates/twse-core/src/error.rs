//! Error types for dataset operations.
//!
//! This module defines [`TwseError`] which covers transport failures reported by
//! providers as well as the few caller errors the core surfaces. Data-quality
//! problems (blank numerics, missing join partners) are never errors.

use thiserror::Error;

use crate::dataset::Dataset;

/// Errors that can occur while retrieving or serving datasets.
#[derive(Error, Debug)]
pub enum TwseError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream service answered with a non-success status.
    #[error("HTTP {status} while fetching {dataset}")]
    Http {
        /// HTTP status code returned by the service.
        status: u16,
        /// The dataset that was being fetched.
        dataset: Dataset,
    },

    /// Error decoding a provider response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No provider is registered for the dataset.
    #[error("Provider not configured for {0}")]
    ProviderNotConfigured(Dataset),

    /// A sort directive outside the supported set was requested.
    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),

    /// A refresh was requested while another one is still running.
    #[error("A refresh is already in progress")]
    RefreshInProgress,

    /// Error building a tabular view of the aggregate.
    #[error("Frame error: {0}")]
    Frame(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`TwseError`].
pub type Result<T> = std::result::Result<T, TwseError>;
