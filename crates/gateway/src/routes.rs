// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard route allow-list.
//!
//! Maps opaque dashboard slugs to trusted upstream origins. The table is the
//! proxy's SSRF defense: no part of an upstream URL is ever derived from
//! request input beyond a slug lookup against this static set, and unknown
//! slugs fail closed.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single dashboard route: slug mapped to a trusted upstream origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    /// URL-safe, globally unique dashboard identifier.
    pub slug: String,
    /// Display name for listings.
    pub name: String,
    /// Upstream base origin, e.g. `http://dash-clv:8050`. Origin only — a
    /// path, query, or fragment here is a config error.
    pub upstream: String,
}

/// Route configuration file format (`--routes`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub dashboards: Vec<RouteEntry>,
}

/// Static slug → upstream allow-list, read-only after startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: HashMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build and validate a table from config. Rejects duplicate slugs,
    /// non-URL-safe slugs, and upstreams that are not bare http(s) origins.
    pub fn from_config(config: RouteConfig) -> anyhow::Result<Self> {
        let mut entries = HashMap::new();
        for mut entry in config.dashboards {
            validate_slug(&entry.slug)?;
            entry.upstream = entry.upstream.trim_end_matches('/').to_owned();
            validate_origin(&entry.slug, &entry.upstream)?;
            if entries.insert(entry.slug.clone(), entry.clone()).is_some() {
                anyhow::bail!("duplicate dashboard slug: {}", entry.slug);
            }
        }
        Ok(Self { entries })
    }

    /// Load a table from a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read route config {}: {e}", path.display()))?;
        let config: RouteConfig = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("invalid route config {}: {e}", path.display()))?;
        Self::from_config(config)
    }

    /// Resolve a slug against the allow-list. Unknown slugs get `None` —
    /// the caller fails closed, never a default host.
    pub fn resolve(&self, slug: &str) -> Option<&RouteEntry> {
        self.entries.get(slug)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }
}

fn validate_slug(slug: &str) -> anyhow::Result<()> {
    if slug.is_empty() {
        anyhow::bail!("empty dashboard slug");
    }
    if !slug.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
        anyhow::bail!("dashboard slug is not URL-safe: {slug:?}");
    }
    Ok(())
}

fn validate_origin(slug: &str, upstream: &str) -> anyhow::Result<()> {
    let rest = upstream
        .strip_prefix("http://")
        .or_else(|| upstream.strip_prefix("https://"))
        .ok_or_else(|| anyhow::anyhow!("upstream for {slug} must be http(s): {upstream:?}"))?;
    if rest.is_empty() {
        anyhow::bail!("upstream for {slug} has no host: {upstream:?}");
    }
    if rest.contains(['/', '?', '#']) || rest.contains(char::is_whitespace) {
        anyhow::bail!("upstream for {slug} must be a bare origin: {upstream:?}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
