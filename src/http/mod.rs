//! HTTP surface
//!
//! Thin axum layer: handlers resolve the request locale, validate
//! parameters and delegate to the views.

pub mod error;
pub mod handler;
pub mod params;
pub mod server;

pub use server::{router, AppState, HttpServer};
