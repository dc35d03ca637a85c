use tracing::debug;

use super::aggregator::MergedChannels;
use crate::config::FallbackConfig;
use crate::registry::IdRegistry;
use crate::xmltv::{XmltvChannel, XmltvProgramme};

/// Placeholder channel and programme for a guide-id without real data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackEntry {
    pub channel: XmltvChannel,
    pub programme: XmltvProgramme,
}

/// Fills coverage gaps left by aggregation
#[derive(Debug, Clone)]
pub struct FallbackSynthesizer {
    title: String,
    description: String,
    start: String,
    stop: String,
}

impl FallbackSynthesizer {
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            start: config.start.trim().to_string(),
            stop: config.stop.trim().to_string(),
        }
    }

    /// One entry per registry id missing from `merged`, in registry order
    pub fn synthesize(&self, registry: &IdRegistry, merged: &MergedChannels) -> Vec<FallbackEntry> {
        let entries: Vec<FallbackEntry> = registry
            .iter()
            .filter(|id| !merged.contains(id))
            .map(|id| self.entry(id))
            .collect();

        debug!(
            "Synthesized {} placeholder channels for {} registry ids",
            entries.len(),
            registry.len()
        );
        entries
    }

    fn entry(&self, id: &str) -> FallbackEntry {
        FallbackEntry {
            channel: XmltvChannel::minimal(id, id, ""),
            programme: XmltvProgramme::minimal(
                id,
                &self.start,
                &self.stop,
                &self.title,
                &self.description,
            ),
        }
    }
}
