use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::Timings;
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_CONFIG_FILE: &str = "dealscout.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout: Option<Duration>,
    pub timings: Timings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".into(),
            request_timeout: Some(Duration::from_secs(30)),
            timings: Timings::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    success_reset_ms: Option<u64>,
    scroll_delay_ms: Option<u64>,
    banner_dismiss_ms: Option<u64>,
    error_hide_ms: Option<u64>,
}

/// Defaults, then the TOML file, then environment variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            debug!(path = %path.display(), "config: loaded file");
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_seconds {
        settings.request_timeout = timeout_from_secs(v);
    }
    if let Some(v) = file_cfg.success_reset_ms {
        settings.timings.success_reset = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.scroll_delay_ms {
        settings.timings.scroll_delay = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.banner_dismiss_ms {
        settings.timings.banner_dismiss = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.error_hide_ms {
        settings.timings.error_hide = Duration::from_millis(v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("DEALSCOUT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
        match v.parse::<u64>() {
            Ok(secs) => settings.request_timeout = timeout_from_secs(secs),
            Err(err) => warn!(value = %v, error = %err, "config: ignoring request timeout"),
        }
    }

    let timing_vars: [(&str, &mut Duration); 4] = [
        ("APP__SUCCESS_RESET_MS", &mut settings.timings.success_reset),
        ("APP__SCROLL_DELAY_MS", &mut settings.timings.scroll_delay),
        ("APP__BANNER_DISMISS_MS", &mut settings.timings.banner_dismiss),
        ("APP__ERROR_HIDE_MS", &mut settings.timings.error_hide),
    ];
    for (key, slot) in timing_vars {
        if let Some(v) = lookup(key) {
            match v.parse::<u64>() {
                Ok(ms) => *slot = Duration::from_millis(ms),
                Err(err) => {
                    warn!(key, value = %v, error = %err, "config: ignoring timing override")
                }
            }
        }
    }
}

/// Zero disables the client-side timeout.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
