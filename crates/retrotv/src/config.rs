use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TvConfig {
    pub default_channel: u32,
    pub min_channel: u32,
    pub max_channel: u32,
}

impl Default for TvConfig {
    fn default() -> Self {
        Self {
            default_channel: 2,
            min_channel: 2,
            max_channel: 57,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Duration the simulated playback surface reports for every video,
    /// in seconds. A real surface reads this from the media metadata.
    pub simulated_duration_secs: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            simulated_duration_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Video { path: PathBuf },
    LiveCamera,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChannelConfig {
    pub number: u32,

    #[serde(flatten)]
    pub source: SourceConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tv: TvConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::read_to_string(path)?;
        let config = toml::from_str(&file)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channels_and_sources() {
        let config: Config = toml::from_str(
            r#"
            [tv]
            default_channel = 3
            min_channel = 2
            max_channel = 13

            [[channels]]
            number = 3
            type = "video"
            path = "media/cartoons.mp4"

            [[channels]]
            number = 13
            type = "live_camera"
            "#,
        )
        .unwrap();

        assert_eq!(config.tv.default_channel, 3);
        assert_eq!(config.tv.max_channel, 13);
        assert_eq!(config.channels.len(), 2);
        assert!(matches!(
            &config.channels[0].source,
            SourceConfig::Video { path } if path == &PathBuf::from("media/cartoons.mp4"),
        ));
        assert!(matches!(
            &config.channels[1].source,
            SourceConfig::LiveCamera,
        ));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.tv.default_channel, 2);
        assert_eq!(config.tv.min_channel, 2);
        assert_eq!(config.tv.max_channel, 57);
        assert_eq!(config.playback.simulated_duration_secs, 60);
        assert!(config.channels.is_empty());
    }
}
