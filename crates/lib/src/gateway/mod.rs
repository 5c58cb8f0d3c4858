//! Gateway HTTP surface: liveness probe and the message pipeline endpoint.

mod server;

pub use server::{run_gateway, GatewayState};
