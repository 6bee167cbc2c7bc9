//! HTTP and WebSocket API

pub mod rest;

pub use rest::{create_router, AppState};
