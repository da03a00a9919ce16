//! HTTP API: configuration, routing, and the request guard.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
