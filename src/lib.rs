//! Optimization MCP Library
//!
//! Client for a remote LP/MIP/TSP optimization service and an MCP tool
//! server that exposes it to assistant hosts.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod mcp;

#[cfg(test)]
pub(crate) mod test_support;
