//! Billgate core library — config, intent extraction and validation,
//! routing, backend invocation, response normalization, and the gateway
//! HTTP server used by the CLI.

pub mod audit;
pub mod backend;
pub mod config;
pub mod envelope;
pub mod gateway;
pub mod init;
pub mod intent;
pub mod llm;
pub mod routing;
