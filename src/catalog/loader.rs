use std::path::Path;
use tracing::{debug, warn};

use crate::errors::{CatalogError, CatalogResult};
use crate::models::{CatalogDocument, RawCatalogEntry};

/// Read and parse the JSON catalog document at `path`
pub fn load_catalog_document(path: &Path) -> CatalogResult<CatalogDocument> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CatalogError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CatalogError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let document: CatalogDocument =
        serde_json::from_str(&contents).map_err(|e| CatalogError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(
        "Loaded {} catalog entries from {}",
        document.channels.len(),
        path.display()
    );
    Ok(document)
}

/// Load catalog entries, degrading to an empty list when the input is missing or unreadable
pub fn load_catalog_or_empty(path: &Path) -> Vec<RawCatalogEntry> {
    match load_catalog_document(path) {
        Ok(document) => document.channels,
        Err(e) => {
            warn!("Using empty channel catalog: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"channels": [{{"name": "Canal Teste", "url": "http://x/1.m3u8", "tvg-id": "Teste.br"}}]}}"#
        )
        .unwrap();

        let document = load_catalog_document(file.path()).unwrap();
        assert_eq!(document.channels.len(), 1);
        assert_eq!(document.channels[0].tvg_id.as_deref(), Some("Teste.br"));
    }

    #[test]
    fn test_missing_catalog_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channels.json");

        let err = load_catalog_document(&path).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(load_catalog_or_empty(&path).is_empty());
    }

    #[test]
    fn test_malformed_catalog_degrades_to_empty() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"channels\": [").unwrap();

        let err = load_catalog_document(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
        assert!(load_catalog_or_empty(file.path()).is_empty());
    }
}
