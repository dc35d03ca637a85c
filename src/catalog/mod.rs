//! Channel catalog construction
//!
//! Turns raw catalog entries plus the configured builtin specials into a
//! deduplicated, id-keyed channel map and the registry of guide-ids that the
//! EPG stage must cover.
//!
//! Ids are slugs of the display name, so the same name always maps to the same
//! id. When two entries slug to the same id only the first one is kept; the
//! dropped entry contributes nothing, not even its guide-id.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

pub mod loader;

pub use loader::{load_catalog_document, load_catalog_or_empty};

use crate::config::{BuiltinSpecialConfig, CatalogConfig};
use crate::models::{ChannelOrigin, ChannelRecord, RawCatalogEntry, StreamKind};
use crate::registry::IdRegistry;
use crate::utils::UrlUtils;

/// Normalize a display name into a channel id
///
/// Lowercases the name, collapses every run of characters outside `[a-z0-9]`
/// into a single underscore and trims underscores from both ends.
///
/// ```rust
/// use iptv_guide::catalog::slugify;
///
/// assert_eq!(slugify("Canal   Teste!!"), "canal_teste");
/// assert_eq!(slugify("  --  "), "");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Id-keyed channel map that remembers insertion order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ChannelRecord>,
    index: HashMap<String, usize>,
}

/// Record counts for status pages
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CatalogSummary {
    pub builtin_specials: usize,
    pub from_catalog: usize,
    pub total: usize,
    pub registry_ids: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record with the same id in place
    ///
    /// Returns the replaced record, if any.
    pub fn insert(&mut self, record: ChannelRecord) -> Option<ChannelRecord> {
        match self.index.get(&record.id) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position], record)),
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ChannelRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ChannelRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ChannelRecord] {
        &self.records
    }

    pub fn count_by_origin(&self, origin: ChannelOrigin) -> usize {
        self.records.iter().filter(|r| r.origin == origin).count()
    }

    pub fn summary(&self, registry: &IdRegistry) -> CatalogSummary {
        CatalogSummary {
            builtin_specials: self.count_by_origin(ChannelOrigin::BuiltinSpecial),
            from_catalog: self.count_by_origin(ChannelOrigin::Catalog),
            total: self.len(),
            registry_ids: registry.len(),
        }
    }
}

/// Builds the channel catalog and the guide-id registry
#[derive(Debug, Clone)]
pub struct ChannelCatalogBuilder {
    video_platform_domains: Vec<String>,
    default_group: String,
}

impl ChannelCatalogBuilder {
    pub fn new(video_platform_domains: Vec<String>, default_group: impl Into<String>) -> Self {
        Self {
            video_platform_domains,
            default_group: default_group.into(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(
            config.video_platform_domains.clone(),
            config.default_group.clone(),
        )
    }

    /// Classify a playback URL by its host
    pub fn classify(&self, url: &str) -> StreamKind {
        if UrlUtils::host_matches(url, &self.video_platform_domains) {
            StreamKind::VideoPlatform
        } else {
            StreamKind::Direct
        }
    }

    /// Build the merged catalog and its registry
    ///
    /// Builtin specials are laid down first; catalog entries are merged over
    /// them and replace a builtin with the same id. The registry holds the
    /// guide-ids of every surviving catalog entry followed by those of the
    /// builtin specials.
    pub fn build(
        &self,
        raw_entries: &[RawCatalogEntry],
        builtin_specials: &[BuiltinSpecialConfig],
    ) -> (Catalog, IdRegistry) {
        let mut registry = IdRegistry::new();
        let catalog_records = self.build_catalog_records(raw_entries, &mut registry);

        let mut catalog = Catalog::new();
        for special in builtin_specials {
            let record = self.special_record(special);
            registry.insert(record.guide_id.clone());
            catalog.insert(record);
        }

        for record in catalog_records {
            if let Some(replaced) = catalog.insert(record) {
                debug!(
                    "Catalog entry '{}' replaces builtin special with the same id",
                    replaced.id
                );
            }
        }

        info!(
            "Built channel catalog: {} channels ({} builtin, {} from catalog), {} guide ids",
            catalog.len(),
            catalog.count_by_origin(ChannelOrigin::BuiltinSpecial),
            catalog.count_by_origin(ChannelOrigin::Catalog),
            registry.len()
        );

        (catalog, registry)
    }

    fn build_catalog_records(
        &self,
        raw_entries: &[RawCatalogEntry],
        registry: &mut IdRegistry,
    ) -> Vec<ChannelRecord> {
        let mut seen = Catalog::new();
        let mut dropped = 0usize;

        for entry in raw_entries {
            let name = entry.name.clone().unwrap_or_default();
            let id = slugify(&name);

            if id.is_empty() || seen.contains(&id) {
                dropped += 1;
                debug!("Skipping catalog entry '{}' (empty or duplicate id '{}')", name, id);
                continue;
            }

            let url = entry.url.clone().unwrap_or_default();
            let guide_id = non_blank(entry.tvg_id.as_deref()).unwrap_or_else(|| id.clone());
            registry.insert(guide_id.clone());

            seen.insert(ChannelRecord {
                stream_kind: self.classify(&url),
                guide_id,
                logo: entry.tvg_logo.clone().unwrap_or_default(),
                group: non_blank(entry.group_title.as_deref())
                    .unwrap_or_else(|| self.default_group.clone()),
                url,
                name,
                id,
                origin: ChannelOrigin::Catalog,
            });
        }

        if dropped > 0 {
            info!("Dropped {} catalog entries with empty or duplicate ids", dropped);
        }

        seen.records
    }

    fn special_record(&self, special: &BuiltinSpecialConfig) -> ChannelRecord {
        let id = special.id.trim().to_string();
        ChannelRecord {
            guide_id: non_blank(special.tvg_id.as_deref()).unwrap_or_else(|| id.clone()),
            name: special.name.clone(),
            stream_kind: self.classify(&special.url),
            url: special.url.clone(),
            logo: special.logo.clone().unwrap_or_default(),
            group: non_blank(special.group.as_deref())
                .unwrap_or_else(|| self.default_group.clone()),
            id,
            origin: ChannelOrigin::BuiltinSpecial,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use proptest::prelude::*;
    use rstest::rstest;

    fn builder() -> ChannelCatalogBuilder {
        ChannelCatalogBuilder::from_config(&CatalogConfig::default())
    }

    fn special(id: &str, name: &str) -> BuiltinSpecialConfig {
        BuiltinSpecialConfig {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("https://www.youtube.com/@{id}/live"),
            group: Some("YOUTUBE".to_string()),
            tvg_id: Some(id.to_string()),
            logo: None,
        }
    }

    #[rstest]
    #[case("Canal Teste", "canal_teste")]
    #[case("Canal   Teste!!", "canal_teste")]
    #[case("  SBT  ", "sbt")]
    #[case("TV Canção Nova", "tv_can_o_nova")]
    #[case("Band-News (HD)", "band_news_hd")]
    #[case("Record_TV", "record_tv")]
    #[case("!!!", "")]
    #[case("", "")]
    fn test_slugify(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(slugify(name), expected);
    }

    proptest! {
        #[test]
        fn prop_slug_shape(name in ".{0,40}") {
            let slug = slugify(&name);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!slug.starts_with('_'));
            prop_assert!(!slug.ends_with('_'));
            prop_assert!(!slug.contains("__"));
        }

        #[test]
        fn prop_slug_is_deterministic_and_idempotent(name in ".{0,40}") {
            let slug = slugify(&name);
            prop_assert_eq!(&slug, &slugify(&name));
            prop_assert_eq!(&slug, &slugify(&slug));
        }
    }

    #[test]
    fn test_duplicate_names_keep_first_entry() {
        let entries = vec![
            RawCatalogEntry::new("Canal Teste", "http://a/1.m3u8").with_tvg_id("first.br"),
            RawCatalogEntry::new("Canal   Teste!!", "http://a/2.m3u8").with_tvg_id("second.br"),
        ];

        let (catalog, registry) = builder().build(&entries, &[]);

        assert_eq!(catalog.len(), 1);
        let record = catalog.get("canal_teste").unwrap();
        assert_eq!(record.url, "http://a/1.m3u8");
        assert_eq!(record.guide_id, "first.br");
        assert!(registry.contains("first.br"));
        assert!(!registry.contains("second.br"));
    }

    #[test]
    fn test_entries_with_empty_ids_are_dropped() {
        let entries = vec![
            RawCatalogEntry::new("???", "http://a/1.m3u8").with_tvg_id("ghost"),
            RawCatalogEntry {
                url: Some("http://a/2.m3u8".into()),
                ..Default::default()
            },
            RawCatalogEntry::new("Globo", "http://a/3.m3u8"),
        ];

        let (catalog, registry) = builder().build(&entries, &[]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn test_guide_id_defaults_to_slug() {
        let entries = vec![
            RawCatalogEntry::new("Rede Vida", "http://a/1.m3u8"),
            RawCatalogEntry::new("TV Brasil", "http://a/2.m3u8").with_tvg_id("  "),
        ];

        let (catalog, registry) = builder().build(&entries, &[]);

        assert_eq!(catalog.get("rede_vida").unwrap().guide_id, "rede_vida");
        assert_eq!(catalog.get("tv_brasil").unwrap().guide_id, "tv_brasil");
        assert!(registry.contains("rede_vida"));
        assert!(registry.contains("tv_brasil"));
    }

    #[test]
    fn test_defaults_for_group_and_logo() {
        let entries = vec![
            RawCatalogEntry::new("Canal A", "http://a/1.m3u8"),
            RawCatalogEntry::new("Canal B", "http://a/2.m3u8")
                .with_group("NOTICIAS")
                .with_logo("http://a/b.png"),
        ];

        let (catalog, _) = builder().build(&entries, &[]);

        let a = catalog.get("canal_a").unwrap();
        assert_eq!(a.group, "GERAL");
        assert_eq!(a.logo, "");
        let b = catalog.get("canal_b").unwrap();
        assert_eq!(b.group, "NOTICIAS");
        assert_eq!(b.logo, "http://a/b.png");
    }

    #[rstest]
    #[case("https://www.youtube.com/@canal/live", StreamKind::VideoPlatform)]
    #[case("https://youtu.be/abcdef", StreamKind::VideoPlatform)]
    #[case("http://cdn.example.com/live/index.m3u8", StreamKind::Direct)]
    #[case("http://cdn.example.com/youtube.com/index.m3u8", StreamKind::Direct)]
    #[case("", StreamKind::Direct)]
    fn test_classify(#[case] url: &str, #[case] expected: StreamKind) {
        assert_eq!(builder().classify(url), expected);
    }

    #[test]
    fn test_catalog_entry_overrides_builtin_special() {
        let specials = vec![special("tvassembleia", "TV Assembleia PI"), special("sbt", "SBT Live")];
        let entries = vec![
            RawCatalogEntry::new("SBT", "http://cdn/sbt.m3u8").with_tvg_id("SBT(Portuguese).br"),
            RawCatalogEntry::new("Cultura", "http://cdn/cultura.m3u8"),
        ];

        let (catalog, registry) = builder().build(&entries, &specials);

        assert_eq!(catalog.len(), 3);
        let sbt = catalog.get("sbt").unwrap();
        assert_eq!(sbt.origin, ChannelOrigin::Catalog);
        assert_eq!(sbt.url, "http://cdn/sbt.m3u8");
        assert_eq!(sbt.stream_kind, StreamKind::Direct);

        // Builtins keep their position ahead of catalog-only entries
        let ids: Vec<&str> = catalog.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["tvassembleia", "sbt", "cultura"]);

        // Both guide ids of the colliding pair stay in the registry
        assert!(registry.contains("SBT(Portuguese).br"));
        assert!(registry.contains("sbt"));
        assert!(registry.contains("tvassembleia"));
        assert!(registry.contains("cultura"));
    }

    #[test]
    fn test_empty_catalog_keeps_builtin_specials() {
        let specials = vec![special("tvassembleia", "TV Assembleia PI"), special("tv_cancao_nova", "TV Canção Nova")];

        let (catalog, registry) = builder().build(&[], &specials);

        assert_eq!(catalog.len(), 2);
        assert_eq!(registry.len(), 2);
        let summary = catalog.summary(&registry);
        assert_eq!(summary.builtin_specials, 2);
        assert_eq!(summary.from_catalog, 0);
        assert_eq!(
            catalog.get("tvassembleia").unwrap().stream_kind,
            StreamKind::VideoPlatform
        );
    }

    #[test]
    fn test_shared_guide_ids_are_registered_once() {
        let entries = vec![
            RawCatalogEntry::new("Globo SP", "http://a/1.m3u8").with_tvg_id("Globo.br"),
            RawCatalogEntry::new("Globo RJ", "http://a/2.m3u8").with_tvg_id("Globo.br"),
        ];

        let (catalog, registry) = builder().build(&entries, &[]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(registry.len(), 1);
    }
}
