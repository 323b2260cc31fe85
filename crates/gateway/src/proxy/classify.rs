// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound proxy request classification and credential extraction.
//!
//! The transport a request arrived on dictates where its credential can
//! live: direct fetches can set a header, iframe navigations only a query
//! string, and iframe-issued AJAX neither — those re-use the page token
//! carried in their `Referer` URL.

/// Static-asset path prefixes served by the embedded dashboards.
const ASSET_PREFIXES: &[&str] = &["_dash-component-suites/", "assets/"];

/// File extensions treated as static assets.
const ASSET_EXTENSIONS: &[&str] = &[
    "js", "css", "map", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "ttf", "eot",
];

/// Route markers of the dashboard framework's own AJAX endpoints: layout
/// fetch, dependency fetch, live update, reload probe.
const INTERNAL_API_MARKERS: &[&str] =
    &["_dash-layout", "_dash-dependencies", "_dash-update-component", "_reload-hash"];

/// How a proxied request is classified; governs credential extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Static file or component bundle; no credential required.
    Asset,
    /// Framework AJAX call from inside the iframe; credential rides in Referer.
    InternalApi,
    /// Initial iframe navigation or direct fetch.
    PageLoad,
}

/// Classify the path below `/proxy/{slug}/`. First match wins.
pub fn classify(path: &str) -> RequestClass {
    if ASSET_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) || has_asset_extension(path) {
        return RequestClass::Asset;
    }
    if INTERNAL_API_MARKERS.iter().any(|marker| path.contains(marker)) {
        return RequestClass::InternalApi;
    }
    RequestClass::PageLoad
}

fn has_asset_extension(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((_, ext)) => ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Extract the `token` query parameter from a raw query string.
pub fn token_from_query(query: &str) -> Option<String> {
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("token=") {
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }
    None
}

/// Re-extract the page's `token` query parameter from an AJAX `Referer` URL.
pub fn token_from_referer(referer: &str) -> Option<String> {
    let (_, query) = referer.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    token_from_query(query)
}

/// Drop the `token` key from a raw query string, leaving every other pair
/// byte-for-byte intact. Idempotent.
pub fn strip_token_param(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.starts_with("token=") && *pair != "token" && !pair.is_empty())
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
