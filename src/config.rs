//! Process configuration for the relay server and the video report.
//!
//! Values come from the environment (after `.env` loading in the binaries) and,
//! for the relay, an optional TOML file named by `RELAY_CONFIG`. Environment
//! variables override file values. Every loader takes a lookup function so the
//! core never reads ambient process state directly.

use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RelayError, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_VIDEO_OUTPUT: &str = "data/videos.md";
pub const DEFAULT_REPORT_TITLE: &str = "Go Meetup Prague Videos";
pub const DEFAULT_REPORT_BLURB: &str =
    "Auto-generated list of all videos from the Go Meetup Prague YouTube channel.";

/// Shape of the optional relay TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
struct RelayConfigFile {
    trigger_url: Option<String>,
    bind_address: Option<String>,
    fail_fast: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base URL the normalized query parameters are appended to.
    pub trigger_url: String,
    pub bind_address: String,
    /// Terminate the process when the trigger request cannot be sent.
    pub fail_fast: bool,
}

impl RelayConfig {
    pub fn new(trigger_url: impl Into<String>) -> Self {
        Self {
            trigger_url: trigger_url.into(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            fail_fast: true,
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Reads `RELAY_CONFIG`, `TRIGGER_URL`, `BIND_ADDRESS` and `RELAY_FAIL_FAST`
    /// through `lookup`.
    pub fn load<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let file = match lookup("RELAY_CONFIG") {
            Some(path) => load_config_file(Path::new(&path))?,
            None => RelayConfigFile::default(),
        };

        let trigger_url = lookup("TRIGGER_URL")
            .or(file.trigger_url)
            .ok_or_else(|| RelayError::Config("TRIGGER_URL is not set".to_string()))?;
        Url::parse(&trigger_url).map_err(|e| RelayError::InvalidTriggerUrl {
            url: trigger_url.clone(),
            reason: e.to_string(),
        })?;

        let bind_address = lookup("BIND_ADDRESS")
            .or(file.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let fail_fast = match lookup("RELAY_FAIL_FAST") {
            Some(value) => parse_bool("RELAY_FAIL_FAST", &value)?,
            None => file.fail_fast.unwrap_or(true),
        };

        Ok(Self {
            trigger_url,
            bind_address,
            fail_fast,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }
}

/// Load and parse the relay configuration file
fn load_config_file(path: &Path) -> Result<RelayConfigFile> {
    let config_str = fs::read_to_string(path).map_err(|e| {
        RelayError::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    toml::from_str(&config_str).map_err(|e| {
        RelayError::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RelayError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub api_key: String,
    pub channel_id: String,
    pub api_base: String,
    pub output_path: PathBuf,
    /// Grouped JSON data file, written only when set.
    pub json_output_path: Option<PathBuf>,
    pub title: String,
    pub blurb: String,
}

impl VideoConfig {
    pub fn load<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                RelayError::Config(format!("{} not set in .env or environment", key))
            })
        };

        Ok(Self {
            api_key: required("GOOGLE_API_KEY")?,
            channel_id: required("CHANNEL_ID")?,
            api_base: lookup("YOUTUBE_API_BASE")
                .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            output_path: lookup("VIDEO_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VIDEO_OUTPUT)),
            json_output_path: lookup("VIDEO_JSON_OUTPUT").map(PathBuf::from),
            title: lookup("VIDEO_REPORT_TITLE").unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string()),
            blurb: lookup("VIDEO_REPORT_BLURB").unwrap_or_else(|| DEFAULT_REPORT_BLURB.to_string()),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn relay_config_requires_trigger_url() {
        let err = RelayConfig::load(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));

        let err = RelayConfig::load(lookup_from(&[("TRIGGER_URL", "  ")])).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn relay_config_defaults() {
        let config =
            RelayConfig::load(lookup_from(&[("TRIGGER_URL", "https://ci.example.com/hook")]))
                .unwrap();
        assert_eq!(config.trigger_url, "https://ci.example.com/hook");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert!(config.fail_fast);
    }

    #[test]
    fn relay_config_rejects_unparseable_trigger_url() {
        let err = RelayConfig::load(lookup_from(&[("TRIGGER_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, RelayError::InvalidTriggerUrl { .. }));
    }

    #[test]
    fn relay_config_parses_fail_fast() {
        let config = RelayConfig::load(lookup_from(&[
            ("TRIGGER_URL", "https://ci.example.com/hook"),
            ("RELAY_FAIL_FAST", "false"),
        ]))
        .unwrap();
        assert!(!config.fail_fast);

        let err = RelayConfig::load(lookup_from(&[
            ("TRIGGER_URL", "https://ci.example.com/hook"),
            ("RELAY_FAIL_FAST", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn relay_config_file_values_are_overridden_by_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "trigger_url = \"https://file.example.com/hook\"\nbind_address = \"0.0.0.0:9000\"\nfail_fast = false"
        )
        .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let config = RelayConfig::load(lookup_from(&[("RELAY_CONFIG", path.as_str())])).unwrap();
        assert_eq!(config.trigger_url, "https://file.example.com/hook");
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert!(!config.fail_fast);

        let config = RelayConfig::load(lookup_from(&[
            ("RELAY_CONFIG", path.as_str()),
            ("TRIGGER_URL", "https://env.example.com/hook"),
            ("RELAY_FAIL_FAST", "true"),
        ]))
        .unwrap();
        assert_eq!(config.trigger_url, "https://env.example.com/hook");
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert!(config.fail_fast);
    }

    #[test]
    fn relay_config_reports_missing_file() {
        let err = RelayConfig::load(lookup_from(&[(
            "RELAY_CONFIG",
            "/nonexistent/relay_config.toml",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn video_config_requires_key_and_channel() {
        let err = VideoConfig::load(lookup_from(&[("CHANNEL_ID", "UC123")])).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));

        let err = VideoConfig::load(lookup_from(&[("GOOGLE_API_KEY", "k")])).unwrap_err();
        assert!(err.to_string().contains("CHANNEL_ID"));
    }

    #[test]
    fn video_config_defaults() {
        let config = VideoConfig::load(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("CHANNEL_ID", "UC123"),
            ("YOUTUBE_API_BASE", "http://127.0.0.1:9999/v3/"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:9999/v3");
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_VIDEO_OUTPUT));
        assert!(config.json_output_path.is_none());
        assert_eq!(config.title, DEFAULT_REPORT_TITLE);
    }
}
