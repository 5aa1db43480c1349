//! Read views over the knowledge graph
//!
//! Every view is request-scoped and holds nothing but a handle to the read
//! port; results are recomputed from scratch on each call.

pub mod catalog;
pub mod error;
pub mod index;
pub mod matrix;
pub mod structure;

pub use catalog::CatalogView;
pub use error::{ViewError, ViewResult};
pub use index::{
    merge_records, paginate, IndexEntry, IndexMerger, IndexPage, IndexParams, IndexRequest,
    IndexSettings, SitemapParams,
};
pub use matrix::{
    AxisEntry, MatrixCell, MatrixEngine, MatrixMode, MatrixParams, MatrixRequest, MatrixResponse,
    MatrixSettings, MatrixStats, Perspective,
};
pub use structure::StructureBuilder;
