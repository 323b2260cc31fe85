// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `dashgate` binary and exercise
//! the proxy surface over HTTP.

use std::time::Duration;

use dashgate_specs::{free_port, spawn_stub_dashboard, write_routes, GatewayProcess};

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn health_reports_running() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let routes = write_routes(&dir, &[("clv", "http://127.0.0.1:1")])?;
    let gateway = GatewayProcess::start(&routes)?;
    gateway.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value =
        reqwest::get(format!("{}/api/health", gateway.base_url())).await?.json().await?;

    assert_eq!(resp["status"], "running");
    assert_eq!(resp["dashboards"], 1);
    Ok(())
}

#[tokio::test]
async fn unknown_dashboard_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let routes = write_routes(&dir, &[("clv", "http://127.0.0.1:1")])?;
    let gateway = GatewayProcess::start(&routes)?;
    gateway.wait_healthy(TIMEOUT).await?;

    let resp =
        reqwest::get(format!("{}/proxy/not-configured/page", gateway.base_url())).await?;
    assert_eq!(resp.status().as_u16(), 404);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"], "INVALID_DASHBOARD");
    Ok(())
}

#[tokio::test]
async fn page_load_round_trip_injects_bearer_credential() -> anyhow::Result<()> {
    let upstream = spawn_stub_dashboard().await?;
    let dir = tempfile::tempdir()?;
    let routes = write_routes(&dir, &[("clv", upstream.as_str())])?;
    let gateway = GatewayProcess::start(&routes)?;
    gateway.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/proxy/clv/overview?token=smoke-tok&theme=dark", gateway.base_url()))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);

    // The stub echoes what it received: credential as bearer auth, token
    // stripped from the forwarded query, proxy prefix re-included.
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["authorization"], "Bearer smoke-tok");
    assert_eq!(body["uri"], "/proxy/clv/overview?theme=dark");
    Ok(())
}

#[tokio::test]
async fn missing_credential_is_unauthorized() -> anyhow::Result<()> {
    let upstream = spawn_stub_dashboard().await?;
    let dir = tempfile::tempdir()?;
    let routes = write_routes(&dir, &[("clv", upstream.as_str())])?;
    let gateway = GatewayProcess::start(&routes)?;
    gateway.wait_healthy(TIMEOUT).await?;

    let resp = reqwest::get(format!("{}/proxy/clv/overview", gateway.base_url())).await?;
    assert_eq!(resp.status().as_u16(), 401);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_service_unavailable() -> anyhow::Result<()> {
    let dead_port = free_port()?;
    let dir = tempfile::tempdir()?;
    let routes = write_routes(&dir, &[("down", &format!("http://127.0.0.1:{dead_port}"))])?;
    let gateway = GatewayProcess::start(&routes)?;
    gateway.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/proxy/down/overview", gateway.base_url()))
        .header("x-tenant-token", "smoke-tok")
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 503);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    Ok(())
}
