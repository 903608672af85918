//! Server identity advertised on `initialize`.

use rmcp::model::{Implementation, ServerCapabilities, ServerInfo};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_NAME: &str = "rednote-mcp";
pub const DEFAULT_DESCRIPTION: &str =
    "MCP server for searching and retrieving content from Xiaohongshu (Red Note) platform.";

/// Process-wide identity, loaded once at startup and shared read-only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(DEFAULT_DESCRIPTION.into()),
        }
    }
}

impl ServerIdentity {
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: self.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: self.description.clone(),
            ..Default::default()
        }
    }
}
