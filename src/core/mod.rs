//! Core gateway logic
//!
//! Data flows one way: resolver → backend strategy → normalizer → gateway →
//! caller. Nothing in here retains cross-request state.

pub mod errors;
pub mod gateway;
pub mod models;
pub mod normalizer;
pub mod resolver;

#[cfg(test)]
mod resolver_tests;


#[cfg(test)]
mod gateway_integration_tests;

// Re-export commonly used types
pub use gateway::Gateway;
pub use models::GatewayConfig;
