//! Feed aggregation
//!
//! Sources are fetched, decompressed and parsed with bounded concurrency, but
//! their results are merged strictly in declared order. That order is the
//! tie-break: the first source (by list position) that contributes a channel
//! owns it. A failing source contributes nothing and does not affect the
//! sources after it.

use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{SourceError, SourceResult};
use crate::registry::IdRegistry;
use crate::sources::{FeedFetcher, FeedSource};
use crate::utils::DecompressionService;
use crate::xmltv::{XmltvChannel, XmltvDocument, XmltvProgramme, parse_document};

/// A channel kept by the merge, with the position of the source that supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedChannel {
    pub channel: XmltvChannel,
    pub source_index: usize,
}

/// Channels keyed by guide-id; the first insert for an id wins
#[derive(Debug, Clone, Default)]
pub struct MergedChannels {
    entries: Vec<MergedChannel>,
    ids: HashSet<String>,
}

impl MergedChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the id is already present; returns whether it was inserted
    pub fn insert_if_absent(&mut self, channel: XmltvChannel, source_index: usize) -> bool {
        if self.ids.contains(channel.id()) {
            return false;
        }
        self.ids.insert(channel.id().to_string());
        self.entries.push(MergedChannel {
            channel,
            source_index,
        });
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&MergedChannel> {
        self.entries.iter().find(|entry| entry.channel.id() == id)
    }

    /// Channels in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &MergedChannel> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one source in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Succeeded {
        /// Registry channels this source was first to supply
        channels_added: usize,
        /// Registry channels already owned by an earlier source
        channels_shadowed: usize,
        programmes_appended: usize,
    },
    Failed(SourceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// Source URL with credentials masked
    pub url: String,
    pub status: SourceStatus,
}

impl SourceReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, SourceStatus::Succeeded { .. })
    }
}

/// Everything the merge produced, plus one report per source in declared order
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    pub channels: MergedChannels,
    pub programmes: Vec<XmltvProgramme>,
    pub sources: Vec<SourceReport>,
}

impl AggregationResult {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|report| !report.is_success())
    }
}

/// Merges guide data from an ordered list of feed sources
pub struct FeedAggregator {
    fetcher: Arc<dyn FeedFetcher>,
    max_concurrent: usize,
}

impl FeedAggregator {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch every source and merge the parts that belong to `registry`
    ///
    /// Never fails as a whole; per-source failures are reported in the result.
    pub async fn aggregate(&self, sources: &[FeedSource], registry: &IdRegistry) -> AggregationResult {
        let started = Instant::now();
        let mut result = AggregationResult::default();

        let mut loaded = futures::stream::iter(sources.iter().cloned())
            .map(|source| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let document = load_source(&*fetcher, &source).await;
                    (source, document)
                }
            })
            .buffered(self.max_concurrent);

        let mut source_index = 0;
        while let Some((source, document)) = loaded.next().await {
            let status = match document {
                Ok(document) => merge_document(&mut result, document, registry, source_index),
                Err(e) => SourceStatus::Failed(e),
            };
            log_source_status(source_index, sources.len(), &source, &status);
            result.sources.push(SourceReport {
                url: source.display_url(),
                status,
            });
            source_index += 1;
        }

        info!(
            "Aggregated {} sources ({} failed): {}/{} registry channels with data, {} programmes in {:?}",
            sources.len(),
            result.failed_sources().count(),
            result.channels.len(),
            registry.len(),
            result.programmes.len(),
            started.elapsed()
        );

        result
    }
}

/// Fetch, decompress and parse one source
async fn load_source(fetcher: &dyn FeedFetcher, source: &FeedSource) -> SourceResult<XmltvDocument> {
    let payload = fetcher.fetch(source).await?;

    let url = source.display_url();
    let format = source.compression_format(&payload);
    let task_url = url.clone();
    tokio::task::spawn_blocking(move || {
        let data = DecompressionService::decompress_as(format, &payload)
            .map_err(|e| SourceError::decompress(&task_url, format!("{e:#}")))?;
        parse_document(&data).map_err(|e| SourceError::parse(&task_url, format!("{e:#}")))
    })
    .await
    .map_err(|e| SourceError::parse(url, format!("Parser task failed: {e}")))?
}

fn merge_document(
    result: &mut AggregationResult,
    document: XmltvDocument,
    registry: &IdRegistry,
    source_index: usize,
) -> SourceStatus {
    let mut channels_added = 0;
    let mut channels_shadowed = 0;
    for channel in document.channels {
        if !registry.contains(channel.id()) {
            continue;
        }
        if result.channels.insert_if_absent(channel, source_index) {
            channels_added += 1;
        } else {
            channels_shadowed += 1;
        }
    }

    let before = result.programmes.len();
    result.programmes.extend(
        document
            .programmes
            .into_iter()
            .filter(|programme| registry.contains(programme.channel())),
    );

    SourceStatus::Succeeded {
        channels_added,
        channels_shadowed,
        programmes_appended: result.programmes.len() - before,
    }
}

fn log_source_status(index: usize, total: usize, source: &FeedSource, status: &SourceStatus) {
    match status {
        SourceStatus::Succeeded {
            channels_added,
            channels_shadowed,
            programmes_appended,
        } => {
            info!(
                "Source {}/{} {}: {} channels added, {} programmes",
                index + 1,
                total,
                source,
                channels_added,
                programmes_appended
            );
            if *channels_shadowed > 0 {
                debug!(
                    "Source {}/{}: {} channels already supplied by earlier sources",
                    index + 1,
                    total,
                    channels_shadowed
                );
            }
        }
        SourceStatus::Failed(e) => {
            warn!(
                "Source {}/{} skipped ({} failure): {}",
                index + 1,
                total,
                e.kind(),
                e
            );
        }
    }
}
