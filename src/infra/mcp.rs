//! MCP server wiring for rednote-mcp-gateway.
//!
//! - Builds the `search_xiaohongshu` handler + tool router pair that both
//!   transports need
//! - Picks the content fetcher from configuration
//! - Supports stdio mode when `MODE=stdio`

use std::{future::Future, pin::Pin, sync::Arc};

use rmcp::handler::server::tool::ToolRouter;

use crate::clients::rednote::RednoteRemote;
use crate::core::mcp::ServerIdentity;
use crate::domain::{ContentFetcher, FetchError, Note};
use crate::infra::config::AppConfig;
use crate::infra::runtime::mcp_transport::{self, LocalSessionManager};
use crate::tools::search::tool_router::{RednoteRouter, RednoteSvc};

pub use rmcp::transport::streamable_http_server::tower::StreamableHttpService;

type NotesFuture = Pin<Box<dyn Future<Output = Result<Vec<Note>, FetchError>> + Send>>;

/// Thin wrapper around a boxed async fn, so callers can plug in any
/// retrieval strategy (or a canned one in tests) without a new type.
pub struct FnFetcher {
    inner: Arc<dyn Fn(String, u32) -> NotesFuture + Send + Sync>,
}

impl FnFetcher {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(String, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Note>, FetchError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |q, c| Box::pin(f(q, c))),
        }
    }
}

#[async_trait::async_trait]
impl ContentFetcher for FnFetcher {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<Note>, FetchError> {
        (self.inner)(query.to_owned(), count).await
    }
}

pub fn factory_with_fetcher(
    fetcher: Arc<dyn ContentFetcher>,
    identity: Arc<ServerIdentity>,
) -> impl Fn() -> (RednoteSvc, RednoteRouter) + Send + Sync + Clone + 'static {
    move || {
        let handler = RednoteSvc::new(fetcher.clone(), identity.clone());
        let tools: ToolRouter<RednoteSvc> = RednoteSvc::router();
        (handler, tools)
    }
}

/// Choose the fetcher for this process. Without a base URL the service still
/// starts, and every call answers with an actionable error.
pub fn fetcher_from_config(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ContentFetcher>> {
    match cfg.base_url() {
        Some(base) => {
            let remote = RednoteRemote::from_config(base, &cfg.fetcher)?;
            tracing::info!(base_url = %base, "using remote content fetcher");
            Ok(Arc::new(remote))
        }
        None => {
            tracing::warn!("REDNOTE_BASE_URL not configured; search_xiaohongshu will return errors");
            Ok(Arc::new(FnFetcher::new(|_q: String, _c: u32| async {
                Err(FetchError::NotConfigured("REDNOTE_BASE_URL"))
            })))
        }
    }
}

pub fn factory_from_config(
    cfg: &AppConfig,
) -> anyhow::Result<impl Fn() -> (RednoteSvc, RednoteRouter) + Send + Sync + Clone + 'static> {
    let fetcher = fetcher_from_config(cfg)?;
    Ok(factory_with_fetcher(fetcher, Arc::new(cfg.server.clone())))
}

pub async fn serve_stdio(cfg: &AppConfig) -> anyhow::Result<()> {
    let factory = factory_from_config(cfg)?;
    mcp_transport::serve_stdio(factory)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

pub type RednoteHttpService = StreamableHttpService<rmcp::handler::server::router::Router<RednoteSvc>, LocalSessionManager>;

pub fn make_streamable_http_service(
    cfg: &AppConfig,
    session_mgr: Arc<LocalSessionManager>,
) -> anyhow::Result<RednoteHttpService> {
    let factory = factory_from_config(cfg)?;
    Ok(mcp_transport::make_streamable_http_service(factory, session_mgr))
}
