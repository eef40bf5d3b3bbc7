//! HTTP API: server wiring, authorization layers and handlers.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
