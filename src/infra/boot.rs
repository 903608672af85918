use crate::infra::config::{AppConfig, Config};
use std::net::SocketAddr;

pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    let app_cfg = AppConfig::from_env_and_toml()?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        server = %app_cfg.server.name,
        version = %app_cfg.server.version,
        fetcher = app_cfg.base_url().unwrap_or("unconfigured"),
        "BOOT rednote-mcp-gateway"
    );

    // Stdio mode: run MCP over stdio ONLY (no HTTP).
    if cfg.mode == "stdio" {
        return crate::infra::mcp::serve_stdio(&app_cfg).await;
    }

    let app = crate::infra::http_app::build_app(&app_cfg)?;
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
