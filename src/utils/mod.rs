//! Shared utilities

pub mod network;
