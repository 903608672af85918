use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::infra::config::AppConfig;
use crate::infra::mcp;
use crate::infra::runtime::mcp_transport::LocalSessionManager;

/// `/healthz` + streamable MCP at `/mcp`.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = mcp::make_streamable_http_service(cfg, session_mgr)?;

    Ok(Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service)))
}
