use std::sync::Arc;

use rmcp::model::JsonObject;

use crate::core::content::{OutputBlock, ToolOutput};
use crate::core::error::GatewayError;
use crate::domain::{ContentFetcher, SearchRequest};
use crate::tools::search::format;

/// Orchestrates one `search_xiaohongshu` call: validate, fetch once, render.
#[derive(Clone)]
pub struct SearchHandler {
    fetcher: Arc<dyn ContentFetcher>,
}

impl SearchHandler {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Run the call and fold any failure into a single error block.
    pub async fn handle(&self, args: &JsonObject) -> ToolOutput {
        let result = match SearchRequest::from_arguments(args) {
            Ok(req) => self.search(&req).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(blocks) => ToolOutput::success(blocks),
            Err(e) => {
                tracing::warn!(error = %e, "search_xiaohongshu failed");
                ToolOutput::error(e.to_string())
            }
        }
    }

    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<OutputBlock>, GatewayError> {
        tracing::info!(query = %req.query, count = req.count, "searching xiaohongshu");
        let notes = self.fetcher.search(&req.query, req.count).await?;
        tracing::debug!(found = notes.len(), "fetch complete");
        Ok(format::render(&req.query, &notes))
    }
}
