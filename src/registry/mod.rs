//! Guide-id registry
//!
//! The set of guide-ids the merged guide must cover. It is the only value
//! shared between the catalog stage and the guide stage, either in memory or
//! through a newline-delimited hand-off file.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::{ChannelCatalogBuilder, load_catalog_or_empty};
use crate::config::CatalogConfig;
use crate::errors::AppResult;
use crate::utils::write_atomic;

/// Deduplicated, insertion-ordered set of guide-ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRegistry {
    ids: Vec<String>,
    members: HashSet<String>,
}

/// Where a resolved registry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOrigin {
    /// Read from the hand-off file
    File,
    /// Rebuilt from the catalog input because no readable hand-off file exists
    Recomputed,
}

impl fmt::Display for RegistryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryOrigin::File => f.write_str("file"),
            RegistryOrigin::Recomputed => f.write_str("recomputed"),
        }
    }
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guide-id; blank ids and repeats are ignored
    ///
    /// Returns `true` when the id was not yet present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.trim().is_empty() || self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Ids in the order they were first registered
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Render the hand-off format: one id per line
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for id in &self.ids {
            text.push_str(id);
            text.push('\n');
        }
        text
    }

    /// Parse the hand-off format, trimming lines and dropping blanks and repeats
    pub fn from_text(text: &str) -> Self {
        text.lines().map(str::trim).collect()
    }

    /// Persist the registry, replacing any previous file atomically
    pub fn save(&self, path: &Path) -> AppResult<()> {
        write_atomic(path, self.to_text().as_bytes())?;
        debug!("Wrote {} guide ids to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let registry = Self::from_text(&text);
        debug!("Read {} guide ids from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Load the hand-off file at `path`, or rebuild the registry from the catalog input
    ///
    /// A file that exists but cannot be read is treated like a missing one.
    pub fn resolve(path: &Path, catalog: &CatalogConfig) -> (Self, RegistryOrigin) {
        if path.exists() {
            match Self::load(path) {
                Ok(registry) => {
                    if registry.is_empty() {
                        warn!("Guide id registry {} is empty", path.display());
                    }
                    return (registry, RegistryOrigin::File);
                }
                Err(e) => warn!(
                    "Failed to read guide id registry {}: {}; rebuilding from catalog {}",
                    path.display(),
                    e,
                    catalog.path.display()
                ),
            }
        } else {
            info!(
                "Guide id registry {} not found, rebuilding from catalog {}",
                path.display(),
                catalog.path.display()
            );
        }

        let entries = load_catalog_or_empty(&catalog.path);
        let (_, registry) =
            ChannelCatalogBuilder::from_config(catalog).build(&entries, &catalog.builtin_specials);
        (registry, RegistryOrigin::Recomputed)
    }
}

impl<S: Into<String>> FromIterator<S> for IdRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut registry = Self::new();
        for id in iter {
            registry.insert(id);
        }
        registry
    }
}
