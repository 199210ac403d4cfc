use std::env;

use anyhow::{anyhow, Result};

use crate::seed;
use crate::services::ServerApp;

/// Read settings from the environment into the app config.
pub fn config(app: &ServerApp) -> Result<()> {
    configure_http(app)?;
    configure_logging(app)?;
    configure_tenants(app)?;
    Ok(())
}

/// `HTTP_HOST` / `HTTP_PORT` → `http.host` / `http.port`.
fn configure_http(app: &ServerApp) -> Result<()> {
    let host = env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());

    port.parse::<u16>()
        .map_err(|_| anyhow!("Invalid HTTP_PORT: {port}"))?;

    app.set("http.host", host);
    app.set("http.port", port);
    Ok(())
}

/// `TENANTRY_LOG_CALLS` → `log.calls`: log every successful service call
/// at info rather than debug.
fn configure_logging(app: &ServerApp) -> Result<()> {
    let Ok(raw) = env::var("TENANTRY_LOG_CALLS") else {
        return Ok(());
    };
    app.set("log.calls", parse_flag("TENANTRY_LOG_CALLS", &raw)?.to_string());
    Ok(())
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(anyhow!("Invalid {name}: {raw}")),
    }
}

/// `TENANTRY_SEED_TENANTS` → `tenants.seed`, checked up front so a typo
/// fails at startup rather than half-way through seeding.
fn configure_tenants(app: &ServerApp) -> Result<()> {
    let Ok(raw) = env::var("TENANTRY_SEED_TENANTS") else {
        return Ok(());
    };
    if raw.trim().is_empty() {
        return Ok(());
    }

    seed::parse_seed(&raw)?;
    app.set("tenants.seed", raw);
    Ok(())
}
