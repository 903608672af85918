//! Core types: output blocks, gateway errors and server identity.

pub mod content;
pub mod error;
pub mod mcp;
