use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, JsonObject, ServerInfo};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::mcp::ServerIdentity;
use crate::domain::ContentFetcher;
use crate::infra::runtime::mcp_transport::ServerHandler;
use crate::tools::search::handler::SearchHandler;

pub const TOOL_NAME: &str = "search_xiaohongshu";

/// Arguments advertised in the tool's `inputSchema`.
///
/// Fields stay loosely typed so a wrong type is reported as a tool error by
/// the handler's validation instead of a protocol error.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// Search keywords (required)
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub query: Option<Value>,
    /// Number of notes to return, a positive integer (default 10)
    #[serde(default)]
    #[schemars(with = "Option<u32>")]
    pub count: Option<Value>,
}

impl SearchArgs {
    fn into_arguments(self) -> JsonObject {
        let mut args = JsonObject::new();
        if let Some(query) = self.query {
            args.insert("query".into(), query);
        }
        if let Some(count) = self.count {
            args.insert("count".into(), count);
        }
        args
    }
}

#[derive(Clone)]
pub struct RednoteSvc {
    handler: SearchHandler,
    identity: Arc<ServerIdentity>,
}

impl RednoteSvc {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, identity: Arc<ServerIdentity>) -> Self {
        Self {
            handler: SearchHandler::new(fetcher),
            identity,
        }
    }
}

impl ServerHandler for RednoteSvc {
    fn get_info(&self) -> ServerInfo {
        self.identity.server_info()
    }
}

#[rmcp::tool_router]
impl RednoteSvc {
    #[rmcp::tool(
        name = "search_xiaohongshu",
        description = "Search Xiaohongshu (Red Note) notes. Arguments: `query` (string, required) search keywords; `count` (integer, optional, default 10) number of results to return. Returns one text block per note plus resource blocks for its images."
    )]
    async fn search_xiaohongshu(
        &self,
        params: Parameters<SearchArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        self.handler
            .handle(&params.0.into_arguments())
            .await
            .into_call_result()
            .map_err(|e| rmcp::ErrorData::internal_error(e.to_string(), None))
    }
}

pub type RednoteRouter = ToolRouter<RednoteSvc>;

impl RednoteSvc {
    pub fn router() -> RednoteRouter {
        // Wrapper to expose the macro-generated private tool_router
        Self::tool_router()
    }
}
