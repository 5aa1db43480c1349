//! knowgraph
//!
//! Read-side aggregation for a curated knowledge graph of methods, concepts,
//! tools and technologies, organized as macro-clusters → clusters → segments.
//!
//! # Architecture
//!
//! - `graph`: the narrow read port (`GraphReader`) and an embedded in-memory
//!   property graph implementing it
//! - `locale`, `localize`: request locales and the localization rehydrator
//! - `model`: the asset domain model built from flat graph rows
//! - `views`: structural trees, the catalog, the matrix and the multi-locale
//!   index, all request-scoped and stateless
//! - `http`: the axum surface over the views
//! - `config`: YAML configuration with environment overrides
//!
//! ## Example Usage
//!
//! ```rust
//! use knowgraph::graph::SeedGraph;
//!
//! let seed = SeedGraph::from_yaml(
//!     "nodes:\n  - type: TOOL\n    properties: { id: t-1, slug: kanban, name_en: Kanban }\n",
//! )
//! .unwrap();
//! let store = seed.into_store().unwrap();
//! assert_eq!(store.node_count(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod http;
pub mod locale;
pub mod localize;
pub mod model;
pub mod views;

// Re-export main types for convenience
pub use config::{AppConfig, ConfigError};
pub use graph::{GraphReader, GraphStore, MemoryGraph, ReadError, ReadQuery, Row, SeedGraph};
pub use http::{router, AppState, HttpServer};
pub use locale::{Locale, LocaleSettings};
pub use model::{Asset, AssetStatus, AssetType};
pub use views::{ViewError, ViewResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
