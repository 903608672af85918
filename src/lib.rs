//! MCP gateway exposing Xiaohongshu (Red Note) search as the
//! `search_xiaohongshu` tool.

pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
