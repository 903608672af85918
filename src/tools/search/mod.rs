//! The `search_xiaohongshu` tool: handler, formatter and rmcp router.

pub mod format;
pub mod handler;
pub mod tool_router;
