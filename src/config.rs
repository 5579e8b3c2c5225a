use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub musicbrainz: MusicBrainzConfig,
    #[serde(default)]
    pub listenbrainz: ListenBrainzConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaylistConfig {
    /// Number of recordings a generated playlist aims for.
    #[serde(default = "default_target_size")]
    pub target_size: usize,
    #[serde(default = "default_max_per_artist")]
    pub max_recordings_per_artist: usize,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            max_recordings_per_artist: default_max_per_artist(),
        }
    }
}

fn default_target_size() -> usize {
    50
}
fn default_max_per_artist() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct MusicBrainzConfig {
    #[serde(default = "default_musicbrainz_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            url: default_musicbrainz_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_musicbrainz_url() -> String {
    "https://musicbrainz.org/ws/2".to_string()
}
fn default_user_agent() -> String {
    format!("setlist/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListenBrainzConfig {
    #[serde(default = "default_dataset_url")]
    pub dataset_url: String,
}

impl Default for ListenBrainzConfig {
    fn default() -> Self {
        Self {
            dataset_url: default_dataset_url(),
        }
    }
}

fn default_dataset_url() -> String {
    "https://datasets.listenbrainz.org".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Fixed pause between retries of a temporarily unavailable lookup.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_delay_ms() -> u64 {
    1000
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            playlist: PlaylistConfig::default(),
            musicbrainz: MusicBrainzConfig::default(),
            listenbrainz: ListenBrainzConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.playlist.target_size == 0 {
        anyhow::bail!("playlist.target_size must be > 0");
    }

    if config.playlist.max_recordings_per_artist == 0 {
        anyhow::bail!("playlist.max_recordings_per_artist must be > 0");
    }

    if config.http.timeout_secs == 0 {
        anyhow::bail!("http.timeout_secs must be > 0");
    }

    for (key, url) in [
        ("musicbrainz.url", &config.musicbrainz.url),
        ("listenbrainz.dataset_url", &config.listenbrainz.dataset_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("{} must be an http(s) URL, got '{}'", key, url);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.playlist.target_size, 50);
        assert_eq!(config.playlist.max_recordings_per_artist, 2);
        assert_eq!(config.http.retry_delay_ms, 1000);
        assert_eq!(
            config.listenbrainz.dataset_url,
            "https://datasets.listenbrainz.org"
        );
    }

    #[test]
    fn overrides_are_read() {
        let config = parse_config(
            r#"
[playlist]
target_size = 20

[http]
retry_delay_ms = 250
"#,
        )
        .unwrap();
        assert_eq!(config.playlist.target_size, 20);
        assert_eq!(config.http.retry_delay_ms, 250);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_config("[playlist]\ntarget_size = 0\n").is_err());
        assert!(parse_config("[musicbrainz]\nurl = \"ftp://mb\"\n").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[playlist]\ntarget_size = 5").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.playlist.target_size, 5);

        assert!(load_config(Path::new("/nonexistent/setlist.toml")).is_err());
    }
}
