//! Asset domain model
//!
//! A closed set of node variants (structural, content, context) sharing a
//! common base record, built from flat read-port rows.

pub mod asset;
pub mod kind;
pub mod row;

pub use asset::{
    Asset, AssetBlock, AssetPreview, CatalogIndexRecord, ContentAsset, ContextAsset,
    StructuralAsset,
};
pub use kind::{AssetFamily, AssetKind, AssetStatus, AssetType, UnknownVariant};
pub use row::{parse_timestamp, RowView};
