use serde::{Deserialize, Serialize};
use std::fmt;

/// How a channel's playback URL is consumed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StreamKind {
    /// The URL is a playable stream and is handed to players as-is
    Direct,
    /// The URL is a page on a video-sharing platform and must be resolved first
    VideoPlatform,
}

/// Where a channel record came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelOrigin {
    BuiltinSpecial,
    Catalog,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Direct => f.write_str("direct"),
            StreamKind::VideoPlatform => f.write_str("video-platform"),
        }
    }
}

/// A channel as exposed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Slug derived from the display name; unique within a catalog
    pub id: String,
    pub name: String,
    pub url: String,
    /// Identifier correlating this channel with guide data (`tvg-id`)
    pub guide_id: String,
    pub logo: String,
    pub group: String,
    pub stream_kind: StreamKind,
    pub origin: ChannelOrigin,
}

/// One entry of the JSON catalog input
///
/// Every field is optional so that a single incomplete entry does not make
/// the whole document unreadable; incomplete entries are filtered later.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawCatalogEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "tvg-id")]
    pub tvg_id: Option<String>,
    #[serde(default, rename = "tvg-logo")]
    pub tvg_logo: Option<String>,
    #[serde(default, rename = "group-title")]
    pub group_title: Option<String>,
}

/// Root of the JSON catalog input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub channels: Vec<RawCatalogEntry>,
}

impl RawCatalogEntry {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_tvg_id<S: Into<String>>(mut self, tvg_id: S) -> Self {
        self.tvg_id = Some(tvg_id.into());
        self
    }

    pub fn with_logo<S: Into<String>>(mut self, logo: S) -> Self {
        self.tvg_logo = Some(logo.into());
        self
    }

    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group_title = Some(group.into());
        self
    }
}
