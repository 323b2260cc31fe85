// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

// ── classification ────────────────────────────────────────────────────

#[parameterized(
    component_suite = { "_dash-component-suites/dash/dcc/async-graph.js" },
    assets_dir = { "assets/logo.png" },
    bare_script = { "vendor/plotly.min.js" },
    stylesheet = { "theme.css" },
    webfont = { "fonts/inter.WOFF2" },
    favicon = { "favicon.ico" },
)]
fn assets(path: &str) {
    assert_eq!(classify(path), RequestClass::Asset);
}

#[parameterized(
    layout = { "_dash-layout" },
    dependencies = { "_dash-dependencies" },
    update = { "_dash-update-component" },
    reload_probe = { "_reload-hash" },
    nested_update = { "v2/_dash-update-component" },
)]
fn internal_api(path: &str) {
    assert_eq!(classify(path), RequestClass::InternalApi);
}

#[parameterized(
    root = { "" },
    page = { "overview" },
    nested_page = { "reports/2026/q1" },
    dotted_dir_plain_file = { "v1.2/report" },
)]
fn page_loads(path: &str) {
    assert_eq!(classify(path), RequestClass::PageLoad);
}

#[test]
fn asset_wins_over_internal_marker() {
    // A bundle that happens to carry a marker in its name is still an asset.
    assert_eq!(classify("_dash-component-suites/_dash-layout.js"), RequestClass::Asset);
}

// ── token extraction ──────────────────────────────────────────────────

#[test]
fn token_from_query_finds_value() {
    assert_eq!(token_from_query("token=abc123"), Some("abc123".to_owned()));
    assert_eq!(token_from_query("a=1&token=abc123&b=2"), Some("abc123".to_owned()));
}

#[test]
fn token_from_query_ignores_empty_and_missing() {
    assert_eq!(token_from_query(""), None);
    assert_eq!(token_from_query("a=1&b=2"), None);
    assert_eq!(token_from_query("token="), None);
    // Key must match exactly; `atoken=` is not a credential.
    assert_eq!(token_from_query("atoken=zzz"), None);
}

#[test]
fn referer_round_trip_recovers_page_token() {
    // Page URL → iframe AJAX → Referer carries it → identical token out.
    let page = "https://shell.example.com/proxy/clv/?token=eyJhbGciOi.payload.sig&theme=dark";
    assert_eq!(token_from_referer(page), Some("eyJhbGciOi.payload.sig".to_owned()));
}

#[test]
fn referer_without_query_or_token_yields_none() {
    assert_eq!(token_from_referer("https://shell.example.com/proxy/clv/"), None);
    assert_eq!(token_from_referer("https://shell.example.com/proxy/clv/?theme=dark"), None);
    assert_eq!(token_from_referer("not a url"), None);
}

#[test]
fn referer_fragment_does_not_leak_into_token() {
    let page = "https://shell.example.com/page?a=1#token=fake";
    assert_eq!(token_from_referer(page), None);
}

// ── token stripping ───────────────────────────────────────────────────

#[test]
fn strip_removes_token_and_keeps_the_rest() {
    assert_eq!(strip_token_param("token=abc"), "");
    assert_eq!(strip_token_param("a=1&token=abc&b=2"), "a=1&b=2");
    assert_eq!(strip_token_param("a=1&b=2"), "a=1&b=2");
    assert_eq!(strip_token_param("token"), "");
}

#[test]
fn strip_is_idempotent() {
    let once = strip_token_param("a=1&token=abc&b=2");
    assert_eq!(strip_token_param(&once), once);
}

#[test]
fn strip_preserves_encoded_values_byte_for_byte() {
    assert_eq!(strip_token_param("q=a%20b%26c&token=t"), "q=a%20b%26c");
}
