use std::env;

use serde::Serialize;

use crate::error::CoreError;
use crate::states::{parse_state_list, StateClassification};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str) -> Result<Option<u64>, CoreError> {
    profiled_env_opt(profile, key)
        .map(|v| {
            v.parse()
                .map_err(|_| CoreError::Config(format!("{key} must be an integer, got '{v}'")))
        })
        .transpose()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub web: WebConfig,
    pub slack: SlackConfig,
    pub states: StateClassification,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TASKWATCH_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, CoreError> {
        let profile = env_or("TASKWATCH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, CoreError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            web: WebConfig::from_env_profiled(p),
            slack: SlackConfig::from_env_profiled(p)?,
            states: states_from_env_profiled(p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  web:         url={}", self.web.url);
        tracing::info!(
            "  slack:       webhook={}, timeout={}",
            if self.slack.webhook_url.is_some() { "(set)" } else { "(none)" },
            self.slack
                .timeout_secs
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "(none)".to_string())
        );
        tracing::info!(
            "  states:      success={}, exception={}, unready={}",
            self.states.success().count(),
            self.states.exception().count(),
            self.states.unready().count()
        );
    }
}

// ── Web UI ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct WebConfig {
    /// Base URL of the monitoring web UI, without a trailing slash.
    pub url: String,
}

impl WebConfig {
    fn from_env_profiled(p: &str) -> Self {
        let url = profiled_env_or(p, "TASKWATCH_WEB_URL", "http://localhost:8000");
        Self {
            url: url.trim_end_matches('/').to_string(),
        }
    }
}

// ── Slack ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SlackConfig {
    #[serde(skip_serializing)]
    pub webhook_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SlackConfig {
    fn from_env_profiled(p: &str) -> Result<Self, CoreError> {
        Ok(Self {
            webhook_url: profiled_env_opt(p, "TASKWATCH_SLACK_WEBHOOK"),
            timeout_secs: profiled_env_u64(p, "TASKWATCH_SLACK_TIMEOUT_SECS")?,
        })
    }
}

// ── State classification ──────────────────────────────────────

fn states_from_env_profiled(p: &str) -> Result<StateClassification, CoreError> {
    let defaults = StateClassification::default();
    let pick = |key: &str, fallback: Vec<String>| {
        profiled_env_opt(p, key)
            .map(|raw| parse_state_list(&raw))
            .unwrap_or(fallback)
    };

    StateClassification::new(
        pick("TASKWATCH_STATES_SUCCESS", owned(defaults.success())),
        pick("TASKWATCH_STATES_EXCEPTION", owned(defaults.exception())),
        pick("TASKWATCH_STATES_UNREADY", owned(defaults.unready())),
    )
}

fn owned<'a>(states: impl Iterator<Item = &'a str>) -> Vec<String> {
    states.map(str::to_string).collect()
}
