//! Loading the initial comment set from JSON.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use shared::domain::Comment;

/// Parses a JSON array of comment records.
pub fn parse_seed(raw: &str) -> Result<Vec<Comment>> {
    serde_json::from_str(raw).context("seed data is not a JSON array of comments")
}

pub fn load_seed_file(path: &Path) -> Result<Vec<Comment>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
    parse_seed(&raw).with_context(|| format!("failed to parse seed file '{}'", path.display()))
}
