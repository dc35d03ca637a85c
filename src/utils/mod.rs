//! Utility modules shared by the catalog and guide stages

pub mod decompression;
pub mod fs;
pub mod url;

// Re-export commonly used types for convenience
pub use decompression::{CompressionFormat, DecompressionService};
pub use fs::{write_atomic, write_atomic_async};
pub use url::UrlUtils;
