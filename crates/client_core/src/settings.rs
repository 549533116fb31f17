use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;

pub const CLIENT_SETTINGS_FILE: &str = "fare_client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Defaults, then `fare_client.toml` (or `path`), then environment variables.
pub fn load_client_settings(path: Option<&Path>) -> ClientSettings {
    let mut settings = ClientSettings::default();
    let path = path.unwrap_or_else(|| Path::new(CLIENT_SETTINGS_FILE));

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(error) => {
            warn!(%error, "ignoring unreadable client settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(secs) = file_cfg
        .get("request_timeout_secs")
        .and_then(|v| parse_timeout(v))
    {
        settings.request_timeout = secs;
    }
}

pub fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("FARE_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(timeout) = lookup("APP__REQUEST_TIMEOUT_SECS").and_then(|v| parse_timeout(&v)) {
        settings.request_timeout = timeout;
    }
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!(value = raw, "ignoring invalid request timeout");
            None
        }
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}
