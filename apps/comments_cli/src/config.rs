use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use shared::domain::{AuthorContext, UserId};
use storage::StoreLatency;

pub const DEFAULT_CONFIG_PATH: &str = "comments.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub seed_path: PathBuf,
    pub read_latency_ms: u64,
    pub write_latency_ms: u64,
    pub author_id: i64,
    pub author_name: String,
    pub author_reputation: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed_path: PathBuf::from("./data/comments.json"),
            read_latency_ms: 0,
            write_latency_ms: 0,
            author_id: 1,
            author_name: "Current User".into(),
            author_reputation: 100,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn latency(&self) -> StoreLatency {
        StoreLatency::from_millis(self.read_latency_ms, self.write_latency_ms)
    }

    pub fn author(&self) -> AuthorContext {
        AuthorContext {
            author_id: UserId(self.author_id),
            author_name: self.author_name.clone(),
            author_reputation: self.author_reputation,
        }
    }
}

pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    let file_cfg = match fs::read_to_string(config_path) {
        Ok(raw) => Some(parse_config_file(&raw).with_context(|| {
            format!("failed to parse config file '{}'", config_path.display())
        })?),
        Err(_) => None,
    };
    Ok(resolve_settings(file_cfg.as_ref(), |key| std::env::var(key).ok()))
}

/// Flat `key = value` table; numbers and strings are both accepted.
fn parse_config_file(raw: &str) -> anyhow::Result<HashMap<String, String>> {
    let table = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    Ok(table
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}

/// File values first, then environment overrides. Unparseable numbers are
/// ignored and the previous value kept.
fn resolve_settings(
    file_cfg: Option<&HashMap<String, String>>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(file_cfg) = file_cfg {
        if let Some(v) = file_cfg.get("seed_path") {
            settings.seed_path = PathBuf::from(v);
        }
        apply_number(&mut settings.read_latency_ms, file_cfg.get("read_latency_ms"));
        apply_number(&mut settings.write_latency_ms, file_cfg.get("write_latency_ms"));
        apply_number(&mut settings.author_id, file_cfg.get("author_id"));
        if let Some(v) = file_cfg.get("author_name") {
            settings.author_name = v.clone();
        }
        apply_number(
            &mut settings.author_reputation,
            file_cfg.get("author_reputation"),
        );
        if let Some(v) = file_cfg.get("log_filter") {
            settings.log_filter = v.clone();
        }
    }

    if let Some(v) = env("COMMENTS_SEED_PATH") {
        settings.seed_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__SEED_PATH") {
        settings.seed_path = PathBuf::from(v);
    }

    apply_number(
        &mut settings.read_latency_ms,
        env("APP__READ_LATENCY_MS").as_ref(),
    );
    apply_number(
        &mut settings.write_latency_ms,
        env("APP__WRITE_LATENCY_MS").as_ref(),
    );
    apply_number(&mut settings.author_id, env("APP__AUTHOR_ID").as_ref());
    if let Some(v) = env("APP__AUTHOR_NAME") {
        settings.author_name = v;
    }
    apply_number(
        &mut settings.author_reputation,
        env("APP__AUTHOR_REPUTATION").as_ref(),
    );
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

fn apply_number<T: std::str::FromStr>(slot: &mut T, raw: Option<&String>) {
    if let Some(parsed) = raw.and_then(|v| v.trim().parse::<T>().ok()) {
        *slot = parsed;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
