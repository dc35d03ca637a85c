//! Guide generation run
//!
//! Resolves the guide-id registry, aggregates the configured feeds, fills the
//! gaps with placeholders and writes one XMLTV document. A run only fails on
//! local problems (configuration, output file); feed failures are reported
//! and the document is written regardless, in the worst case made up
//! entirely of placeholders.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub mod aggregator;
pub mod fallback;

pub use aggregator::{
    AggregationResult, FeedAggregator, MergedChannel, MergedChannels, SourceReport, SourceStatus,
};
pub use fallback::{FallbackEntry, FallbackSynthesizer};

use crate::config::Config;
use crate::errors::AppResult;
use crate::registry::{IdRegistry, RegistryOrigin};
use crate::sources::{FeedFetcher, FeedSource, HttpFeedFetcher};
use crate::utils::write_atomic_async;
use crate::xmltv::{DocumentWriter, XmltvChannel, XmltvProgramme};

/// Final channel and programme lists in output order
#[derive(Debug, Clone, Default)]
pub struct MergedDocument {
    pub channels: Vec<XmltvChannel>,
    pub programmes: Vec<XmltvProgramme>,
}

impl MergedDocument {
    /// Real entries first, placeholders after them
    pub fn assemble(aggregation: AggregationResult, fallback: Vec<FallbackEntry>) -> Self {
        let mut channels: Vec<XmltvChannel> = aggregation
            .channels
            .iter()
            .map(|merged| merged.channel.clone())
            .collect();
        let mut programmes = aggregation.programmes;

        channels.reserve(fallback.len());
        programmes.reserve(fallback.len());
        for entry in fallback {
            channels.push(entry.channel);
            programmes.push(entry.programme);
        }

        Self {
            channels,
            programmes,
        }
    }

    pub fn render(&self, writer: &DocumentWriter) -> Vec<u8> {
        writer
            .render(&self.channels, &self.programmes)
            .into_bytes()
    }
}

/// Summary of one guide generation run
#[derive(Debug, Clone)]
pub struct EpgRunReport {
    pub registry_ids: usize,
    pub registry_origin: RegistryOrigin,
    pub channels_with_data: usize,
    pub programmes: usize,
    pub fallback_channels: usize,
    pub sources: Vec<SourceReport>,
    pub output_path: PathBuf,
    pub output_bytes: usize,
    pub elapsed: Duration,
}

impl EpgRunReport {
    pub fn sources_failed(&self) -> usize {
        self.sources.iter().filter(|s| !s.is_success()).count()
    }

    pub fn log(&self) {
        info!(
            "Guide written to {} ({} bytes) in {:?}: {} channels ({} with data, {} placeholders), {} programmes, {}/{} sources ok, registry from {}",
            self.output_path.display(),
            self.output_bytes,
            self.elapsed,
            self.registry_ids,
            self.channels_with_data,
            self.fallback_channels,
            self.programmes,
            self.sources.len() - self.sources_failed(),
            self.sources.len(),
            self.registry_origin
        );
        for report in &self.sources {
            if let SourceStatus::Failed(e) = &report.status {
                warn!("Failed source {}: {}", report.url, e);
            }
        }
    }
}

/// Runs the aggregation pipeline with a given configuration
pub struct EpgService {
    config: Config,
    fetcher: Arc<dyn FeedFetcher>,
}

impl EpgService {
    pub fn new(config: Config, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Service backed by the HTTP fetcher configured in `[epg]`
    pub fn from_config(config: Config) -> AppResult<Self> {
        let fetcher = HttpFeedFetcher::from_config(&config.epg)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    pub fn sources(&self) -> Vec<FeedSource> {
        self.config
            .epg
            .sources
            .iter()
            .map(FeedSource::from_config)
            .collect()
    }

    /// Resolve the registry from the hand-off file (or the catalog) and run
    pub async fn run(&self) -> AppResult<EpgRunReport> {
        let (registry, origin) =
            IdRegistry::resolve(&self.config.catalog.registry_path, &self.config.catalog);
        info!(
            "Using {} guide ids ({})",
            registry.len(),
            origin
        );
        self.run_with_registry(&registry, origin).await
    }

    pub async fn run_with_registry(
        &self,
        registry: &IdRegistry,
        origin: RegistryOrigin,
    ) -> AppResult<EpgRunReport> {
        let started = Instant::now();

        let (document, aggregation_sources, channels_with_data, fallback_channels) =
            self.build_document(registry).await;
        let real_programmes = document.programmes.len() - fallback_channels;

        let writer = DocumentWriter::new(self.config.epg.generator_name.as_str());
        let bytes = document.render(&writer);
        let output_path = self.config.epg.output_path.clone();
        write_output(&output_path, &bytes).await?;

        let report = EpgRunReport {
            registry_ids: registry.len(),
            registry_origin: origin,
            channels_with_data,
            programmes: real_programmes,
            fallback_channels,
            sources: aggregation_sources,
            output_path,
            output_bytes: bytes.len(),
            elapsed: started.elapsed(),
        };
        report.log();
        Ok(report)
    }

    async fn build_document(
        &self,
        registry: &IdRegistry,
    ) -> (MergedDocument, Vec<SourceReport>, usize, usize) {
        let aggregator = FeedAggregator::new(
            Arc::clone(&self.fetcher),
            self.config.epg.max_concurrent_fetches,
        );
        let mut aggregation = aggregator.aggregate(&self.sources(), registry).await;

        let fallback =
            FallbackSynthesizer::new(&self.config.epg.fallback).synthesize(registry, &aggregation.channels);

        let sources = std::mem::take(&mut aggregation.sources);
        let channels_with_data = aggregation.channels.len();
        let fallback_channels = fallback.len();
        (
            MergedDocument::assemble(aggregation, fallback),
            sources,
            channels_with_data,
            fallback_channels,
        )
    }
}

async fn write_output(path: &Path, bytes: &[u8]) -> AppResult<()> {
    write_atomic_async(path, bytes).await.map_err(|e| {
        crate::errors::AppError::output(format!(
            "Failed to write guide to {}: {e}",
            path.display()
        ))
    })
}
