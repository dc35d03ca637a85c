//! Centralized error handling for the guide builder
//!
//! # Error Categories
//!
//! - **Catalog Errors**: missing or malformed channel catalog input
//! - **Source Errors**: per-feed fetch, decompression and parse failures
//! - **Application Errors**: configuration, file I/O and output generation
//!
//! Catalog and source errors are recoverable by design: callers log them and
//! degrade (empty catalog, skipped feed) instead of aborting a run.
//!
//! # Usage
//!
//! ```rust
//! use iptv_guide::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for catalog loading Results
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convenience type alias for per-source Results
pub type SourceResult<T> = Result<T, SourceError>;
