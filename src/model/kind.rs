//! Asset type and status enumerations

use crate::graph::Label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn normalize(raw: &str) -> String {
    raw.trim().replace('-', "_").to_ascii_uppercase()
}

/// Closed set of node types in the knowledge graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    MacroCluster,
    Cluster,
    Segment,
    ClusterView,
    Concept,
    Method,
    Tool,
    Technology,
    Role,
}

/// Which domain variant a type maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFamily {
    Structural,
    Content,
    Context,
}

impl AssetType {
    pub const ALL: [AssetType; 9] = [
        AssetType::MacroCluster,
        AssetType::Cluster,
        AssetType::Segment,
        AssetType::ClusterView,
        AssetType::Concept,
        AssetType::Method,
        AssetType::Tool,
        AssetType::Technology,
        AssetType::Role,
    ];

    pub const CONTENT: [AssetType; 4] = [
        AssetType::Concept,
        AssetType::Method,
        AssetType::Tool,
        AssetType::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::MacroCluster => "MACRO_CLUSTER",
            AssetType::Cluster => "CLUSTER",
            AssetType::Segment => "SEGMENT",
            AssetType::ClusterView => "CLUSTER_VIEW",
            AssetType::Concept => "CONCEPT",
            AssetType::Method => "METHOD",
            AssetType::Tool => "TOOL",
            AssetType::Technology => "TECHNOLOGY",
            AssetType::Role => "ROLE",
        }
    }

    /// Case-insensitive parse; `-` is accepted in place of `_`
    pub fn parse(raw: &str) -> Option<AssetType> {
        let wanted = normalize(raw);
        AssetType::ALL.into_iter().find(|t| t.as_str() == wanted)
    }

    pub fn family(&self) -> AssetFamily {
        match self {
            AssetType::MacroCluster
            | AssetType::Cluster
            | AssetType::Segment
            | AssetType::ClusterView => AssetFamily::Structural,
            AssetType::Concept | AssetType::Method | AssetType::Tool | AssetType::Technology => {
                AssetFamily::Content
            }
            AssetType::Role => AssetFamily::Context,
        }
    }

    pub fn is_content(&self) -> bool {
        self.family() == AssetFamily::Content
    }

    pub fn label(&self) -> Label {
        Label::new(self.as_str())
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetType::parse(s).ok_or_else(|| UnknownVariant {
            kind: "asset type",
            value: s.to_string(),
        })
    }
}

/// Type field of an asset: a known [`AssetType`] or the raw value of a type
/// this build does not recognize
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetKind {
    Known(AssetType),
    Other(String),
}

impl AssetKind {
    pub fn from_raw(raw: &str) -> AssetKind {
        AssetType::parse(raw)
            .map(AssetKind::Known)
            .unwrap_or_else(|| AssetKind::Other(raw.to_string()))
    }

    pub fn known(&self) -> Option<AssetType> {
        match self {
            AssetKind::Known(t) => Some(*t),
            AssetKind::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssetKind::Known(t) => t.as_str(),
            AssetKind::Other(raw) => raw,
        }
    }
}

/// Editorial lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    #[default]
    Draft,
    Review,
    Published,
    Deprecated,
    Archived,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 5] = [
        AssetStatus::Draft,
        AssetStatus::Review,
        AssetStatus::Published,
        AssetStatus::Deprecated,
        AssetStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Draft => "DRAFT",
            AssetStatus::Review => "REVIEW",
            AssetStatus::Published => "PUBLISHED",
            AssetStatus::Deprecated => "DEPRECATED",
            AssetStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(raw: &str) -> Option<AssetStatus> {
        let wanted = normalize(raw);
        AssetStatus::ALL.into_iter().find(|s| s.as_str() == wanted)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetStatus::parse(s).ok_or_else(|| UnknownVariant {
            kind: "status",
            value: s.to_string(),
        })
    }
}
