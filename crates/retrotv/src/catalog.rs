use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::warn;

use crate::config::{Config, SourceConfig};

#[derive(Clone, Debug)]
pub enum Source {
    Video(PathBuf),
    LiveCamera,
}

impl From<&SourceConfig> for Source {
    fn from(value: &SourceConfig) -> Self {
        match value {
            SourceConfig::Video { path } => Self::Video(path.clone()),
            SourceConfig::LiveCamera => Self::LiveCamera,
        }
    }
}

/// Channel number to media source mapping, immutable after startup.
///
/// Numbers inside `[min_channel, max_channel]` are valid switch targets
/// whether or not a source is mapped; hitting an unmapped number at load
/// time is the `ConfigurationMiss` path, matching a tuner that shows an
/// empty channel for a dead frequency.
pub struct ChannelCatalog {
    min_channel: u32,
    max_channel: u32,
    sources: BTreeMap<u32, Source>,
}

impl ChannelCatalog {
    pub fn new(min_channel: u32, max_channel: u32, sources: BTreeMap<u32, Source>) -> Self {
        Self {
            min_channel,
            max_channel,
            sources,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let sources = config
            .channels
            .iter()
            .map(|channel| (channel.number, Source::from(&channel.source)))
            .collect::<BTreeMap<_, _>>();

        let catalog = Self::new(config.tv.min_channel, config.tv.max_channel, sources);

        let unmapped = (catalog.min_channel..=catalog.max_channel)
            .filter(|number| !catalog.sources.contains_key(number))
            .count();

        if unmapped > 0 {
            warn!(unmapped, "Channels in range without a mapped source");
        }

        catalog
    }

    pub fn min_channel(&self) -> u32 {
        self.min_channel
    }

    pub fn max_channel(&self) -> u32 {
        self.max_channel
    }

    pub fn get(&self, number: u32) -> Option<&Source> {
        self.sources.get(&number)
    }

    pub fn in_range(&self, number: u32) -> bool {
        (self.min_channel..=self.max_channel).contains(&number)
    }

    pub fn next_up(&self, current: u32) -> u32 {
        if current >= self.max_channel {
            self.min_channel
        } else {
            current + 1
        }
    }

    pub fn next_down(&self, current: u32) -> u32 {
        if current <= self.min_channel {
            self.max_channel
        } else {
            current - 1
        }
    }
}
