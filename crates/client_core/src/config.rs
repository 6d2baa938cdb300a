use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "quizdesk.toml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub notice_dismiss_secs: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            notice_dismiss_secs: 5,
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn notice_dismiss_after(&self) -> Duration {
        Duration::from_secs(self.notice_dismiss_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    notice_dismiss_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `quizdesk.toml` in the working directory, then the environment.
pub fn load_settings() -> ClientSettings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

pub fn load_settings_from_path(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str::<FileSettings>(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    Ok(load_settings_from(Some(&raw), |key| std::env::var(key).ok()))
}

/// Settings for a binary: an explicit `--config` file or the default layering,
/// then the `--api-url` flag on top.
pub fn resolve_settings(
    config_path: Option<&Path>,
    api_url: Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = match config_path {
        Some(path) => load_settings_from_path(path)?,
        None => load_settings(),
    };
    if let Some(api_url) = api_url {
        settings.api_base_url = api_url;
    }
    Ok(settings)
}

pub fn load_settings_from(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.notice_dismiss_secs {
                    settings.notice_dismiss_secs = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = Some(v).filter(|secs| *secs > 0);
                }
            }
            Err(err) => tracing::warn!(%err, "ignoring malformed {SETTINGS_FILE}"),
        }
    }

    if let Some(v) = env("QUIZDESK_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__NOTICE_DISMISS_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notice_dismiss_secs = parsed;
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed).filter(|secs| *secs > 0);
        }
    }

    settings
}

/// Validates an API base URL and strips trailing slashes.
pub fn prepare_api_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_BASE_URL.to_string());
    }

    let parsed = Url::parse(raw).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("api base url must use http or https, got '{}'", parsed.scheme());
    }
    if parsed.cannot_be_a_base() {
        bail!("api base url '{raw}' cannot be used as a base");
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
