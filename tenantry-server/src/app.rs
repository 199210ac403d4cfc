use anyhow::Result;
use serde_json::Value;
use tenantry_axum::{axum, AxumApp};
use tenantry_core::TenantryApp;

use crate::services::TenantryParams;

pub fn tenantry_app() -> Result<AxumApp<Value, TenantryParams>> {
    let app: TenantryApp<Value, TenantryParams> = TenantryApp::new();

    app.set("http.host", "127.0.0.1");
    app.set("http.port", "3000");
    app.set("log.calls", "false");
    crate::config::config(&app)?;

    Ok(axum(app))
}
