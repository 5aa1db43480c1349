//! Matrix aggregation engine
//!
//! Cross-tabulates content assets over two axes:
//!
//! | mode                  | x axis                 | y axis                 | cell contains                                  |
//! |-----------------------|------------------------|------------------------|------------------------------------------------|
//! | `SEGMENT_SEGMENT`     | segments of cluster A  | segments of cluster B  | assets contained by both segments              |
//! | `SEGMENT_PERSPECTIVE` | segments of a cluster  | perspective buckets    | assets of the segment classified in the bucket |
//! | `ROLE_PERSPECTIVE`    | caller-supplied roles  | perspective buckets    | assets of the role classified in the bucket    |
//!
//! Cells hold at most `cell_limit` previews, but `count` is always the full
//! match size, so `has_more == count > items.len()`. Stats are derived from
//! the finished cell set on every request.

use super::error::{ViewError, ViewResult};
use super::structure::StructureBuilder;
use crate::graph::{GraphReader, ReadQuery, Row};
use crate::locale::{Locale, LocaleSettings};
use crate::model::{AssetPreview, AssetType, StructuralAsset};
use futures::future::try_join;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatrixMode {
    SegmentSegment,
    SegmentPerspective,
    RolePerspective,
}

impl MatrixMode {
    const ALL: [MatrixMode; 3] = [
        MatrixMode::SegmentSegment,
        MatrixMode::SegmentPerspective,
        MatrixMode::RolePerspective,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixMode::SegmentSegment => "SEGMENT_SEGMENT",
            MatrixMode::SegmentPerspective => "SEGMENT_PERSPECTIVE",
            MatrixMode::RolePerspective => "ROLE_PERSPECTIVE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL.into_iter().find(|m| m.as_str() == wanted)
    }
}

impl fmt::Display for MatrixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification dimension used as the y axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Perspective {
    ValueStream,
    DecisionType,
    OrganizationalMaturity,
}

impl Perspective {
    const ALL: [Perspective; 3] = [
        Perspective::ValueStream,
        Perspective::DecisionType,
        Perspective::OrganizationalMaturity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Perspective::ValueStream => "VALUE_STREAM",
            Perspective::DecisionType => "DECISION_TYPE",
            Perspective::OrganizationalMaturity => "ORGANIZATIONAL_MATURITY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL.into_iter().find(|p| p.as_str() == wanted)
    }

    /// Fixed bucket enumeration, in axis order
    pub fn buckets(&self) -> &'static [&'static str] {
        match self {
            Perspective::ValueStream => &["discovery", "build", "run", "iterate"],
            Perspective::DecisionType => &["strategic", "tactical", "operational"],
            Perspective::OrganizationalMaturity => &["initial", "developing", "established", "optimizing"],
        }
    }

    /// Row field holding the classification
    pub fn field(&self) -> &'static str {
        match self {
            Perspective::ValueStream => "valueStreamStage",
            Perspective::DecisionType => "decisionType",
            Perspective::OrganizationalMaturity => "organizationalMaturity",
        }
    }

    /// The bucket a row falls into; unclassified rows fall into none
    pub fn bucket_of(&self, row: &Row) -> Option<&'static str> {
        let value = row.get(self.field())?.as_str()?.trim().to_ascii_lowercase();
        self.buckets().iter().copied().find(|b| *b == value)
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixSettings {
    pub default_cell_limit: usize,
    pub max_cell_limit: usize,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self {
            default_cell_limit: 12,
            max_cell_limit: 50,
        }
    }
}

/// Upper bound on `cell_limit`, whatever the configuration says
pub const HARD_MAX_CELL_LIMIT: usize = 50;

impl MatrixSettings {
    /// Unparseable values fall back to the default; others are clamped
    pub fn cell_limit(&self, raw: Option<&str>) -> usize {
        let max = self.max_cell_limit.clamp(1, HARD_MAX_CELL_LIMIT);
        raw.and_then(|r| r.trim().parse::<usize>().ok())
            .unwrap_or(self.default_cell_limit)
            .clamp(1, max)
    }
}

/// Raw matrix query parameters as they arrive over HTTP
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixParams {
    pub cluster_id: Option<String>,
    pub mode: Option<String>,
    pub perspective: Option<String>,
    pub content_types: Option<String>,
    pub lang: Option<String>,
    pub cell_limit: Option<String>,
    pub x_ids: Option<String>,
    pub y_cluster_id: Option<String>,
}

/// Validated matrix request
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRequest {
    pub mode: MatrixMode,
    pub cluster_id: String,
    pub y_cluster_id: Option<String>,
    pub perspective: Option<Perspective>,
    pub content_types: Vec<AssetType>,
    pub x_ids: Vec<String>,
    pub cell_limit: usize,
    pub lang: Locale,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(raw: &'a Option<String>, name: &str, mode: MatrixMode) -> ViewResult<&'a str> {
    present(raw).ok_or_else(|| {
        ViewError::bad_request(format!("Missing required parameter '{}' for mode {}", name, mode))
    })
}

/// Comma-separated values in first-seen order, repeats dropped
fn split_list(raw: &Option<String>) -> Vec<String> {
    present(raw)
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect::<IndexSet<_>>()
                .into_iter()
                .collect()
        })
        .unwrap_or_default()
}

impl MatrixRequest {
    /// Validate raw parameters. Runs before any graph read.
    pub fn from_params(
        params: &MatrixParams,
        settings: &MatrixSettings,
        locales: &LocaleSettings,
    ) -> ViewResult<Self> {
        let raw_mode = present(&params.mode)
            .ok_or_else(|| ViewError::bad_request("Missing required parameter 'mode'"))?;
        let mode = MatrixMode::parse(raw_mode).ok_or_else(|| {
            ViewError::bad_request(format!(
                "Invalid mode '{}'; expected one of SEGMENT_SEGMENT, SEGMENT_PERSPECTIVE, ROLE_PERSPECTIVE",
                raw_mode
            ))
        })?;

        let cluster_id = required(&params.cluster_id, "clusterId", mode)?.to_string();

        let perspective = match present(&params.perspective) {
            Some(raw) => Some(Perspective::parse(raw).ok_or_else(|| {
                ViewError::bad_request(format!(
                    "Invalid perspective '{}'; expected one of VALUE_STREAM, DECISION_TYPE, ORGANIZATIONAL_MATURITY",
                    raw
                ))
            })?),
            None => None,
        };
        if mode != MatrixMode::SegmentSegment && perspective.is_none() {
            return Err(ViewError::bad_request(format!(
                "Missing required parameter 'perspective' for mode {}",
                mode
            )));
        }

        let y_cluster_id = match mode {
            MatrixMode::SegmentSegment => Some(required(&params.y_cluster_id, "yClusterId", mode)?.to_string()),
            _ => None,
        };

        let x_ids = split_list(&params.x_ids);
        if mode == MatrixMode::RolePerspective && x_ids.is_empty() {
            return Err(ViewError::bad_request(format!(
                "Missing required parameter 'xIds' for mode {}",
                mode
            )));
        }

        let mut content_types = Vec::new();
        for raw in split_list(&params.content_types) {
            let asset_type = AssetType::parse(&raw)
                .filter(AssetType::is_content)
                .ok_or_else(|| ViewError::bad_request(format!("Invalid content type '{}'", raw)))?;
            if !content_types.contains(&asset_type) {
                content_types.push(asset_type);
            }
        }
        if content_types.is_empty() {
            content_types = AssetType::CONTENT.to_vec();
        }

        Ok(MatrixRequest {
            mode,
            cluster_id,
            y_cluster_id,
            perspective,
            content_types,
            x_ids,
            cell_limit: settings.cell_limit(params.cell_limit.as_deref()),
            lang: locales.resolve_one(params.lang.as_deref()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisEntry {
    pub id: String,
    /// `SEGMENT`, `ROLE`, or the perspective name
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    pub x_id: String,
    pub y_id: String,
    pub count: usize,
    pub items: Vec<AssetPreview>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixStats {
    pub non_empty_cells: usize,
    pub total_items: usize,
    pub cell_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixResponse {
    pub mode: MatrixMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Perspective>,
    pub x_axis: Vec<AxisEntry>,
    pub y_axis: Vec<AxisEntry>,
    pub cells: Vec<MatrixCell>,
    pub stats: MatrixStats,
}

/// Content rows grouped by the id of the axis entry they were read for,
/// each group in server order
struct Grouped<'r> {
    by_key: HashMap<String, Vec<&'r Row>>,
}

impl<'r> Grouped<'r> {
    fn new(rows: &'r [Row], key: &str) -> Self {
        let mut by_key: HashMap<String, Vec<&'r Row>> = HashMap::new();
        for row in rows {
            if let Some(owner) = row.get(key).and_then(Value::as_str) {
                by_key.entry(owner.to_string()).or_default().push(row);
            }
        }
        Self { by_key }
    }

    fn rows(&self, owner: &str) -> impl Iterator<Item = &'r Row> + '_ {
        self.by_key.get(owner).into_iter().flatten().copied()
    }

    fn ids(&self, owner: &str) -> HashSet<&'r str> {
        self.rows(owner).filter_map(row_id).collect()
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn build_cell<'r>(
    x_id: &str,
    y_id: &str,
    candidates: impl Iterator<Item = &'r Row>,
    limit: usize,
    lang: &Locale,
) -> MatrixCell {
    let mut seen = HashSet::new();
    let mut count = 0;
    let mut items = Vec::new();
    for row in candidates {
        let Some(id) = row_id(row) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        count += 1;
        if items.len() < limit {
            items.push(AssetPreview::from_row(row, lang));
        }
    }
    MatrixCell {
        x_id: x_id.to_string(),
        y_id: y_id.to_string(),
        count,
        has_more: count > items.len(),
        items,
    }
}

fn segment_axis(segments: &[StructuralAsset]) -> Vec<AxisEntry> {
    segments
        .iter()
        .map(|s| AxisEntry {
            id: s.base.id.clone(),
            key: "SEGMENT".to_string(),
            label: s.base.name.clone(),
        })
        .collect()
}

fn bucket_axis(perspective: Perspective) -> Vec<AxisEntry> {
    perspective
        .buckets()
        .iter()
        .map(|b| AxisEntry {
            id: b.to_string(),
            key: perspective.as_str().to_string(),
            label: b.to_string(),
        })
        .collect()
}

fn stats(cells: &[MatrixCell], cell_limit: usize) -> MatrixStats {
    let (non_empty_cells, total_items) = cells
        .iter()
        .filter(|c| c.count > 0)
        .fold((0, 0), |(n, total), c| (n + 1, total + c.count));
    MatrixStats {
        non_empty_cells,
        total_items,
        cell_limit,
    }
}

#[derive(Clone)]
pub struct MatrixEngine {
    reader: Arc<dyn GraphReader>,
    structure: StructureBuilder,
}

impl MatrixEngine {
    pub fn new(reader: Arc<dyn GraphReader>) -> Self {
        Self {
            structure: StructureBuilder::new(Arc::clone(&reader)),
            reader,
        }
    }

    pub async fn build(&self, request: &MatrixRequest) -> ViewResult<MatrixResponse> {
        let response = match (request.mode, request.perspective) {
            (MatrixMode::SegmentSegment, _) => self.segment_by_segment(request).await?,
            (MatrixMode::SegmentPerspective, Some(perspective)) => {
                self.segment_by_perspective(request, perspective).await?
            }
            (MatrixMode::RolePerspective, Some(perspective)) => {
                self.role_by_perspective(request, perspective).await?
            }
            (mode, None) => {
                return Err(ViewError::bad_request(format!(
                    "Missing required parameter 'perspective' for mode {}",
                    mode
                )))
            }
        };
        debug!(
            "Matrix {} built: {} cells, {} non-empty",
            request.mode,
            response.cells.len(),
            response.stats.non_empty_cells
        );
        Ok(response)
    }

    async fn segment_contents(&self, segment_ids: Vec<String>, request: &MatrixRequest) -> ViewResult<Vec<Row>> {
        let query = ReadQuery::SegmentContents {
            segment_ids,
            types: request.content_types.clone(),
        };
        Ok(self.reader.run_read_query(&query, &request.lang).await?)
    }

    async fn segment_by_segment(&self, request: &MatrixRequest) -> ViewResult<MatrixResponse> {
        let y_cluster = request.y_cluster_id.as_deref().unwrap_or(&request.cluster_id);
        let (xs, ys) = try_join(
            self.structure.find_segments_by_id(&request.cluster_id, &request.lang),
            self.structure.find_segments_by_id(y_cluster, &request.lang),
        )
        .await?;

        let segment_ids: IndexSet<String> = xs.iter().chain(ys.iter()).map(|s| s.base.id.clone()).collect();
        let rows = self.segment_contents(segment_ids.into_iter().collect(), request).await?;
        let grouped = Grouped::new(&rows, "segmentId");

        let x_axis = segment_axis(&xs);
        let y_axis = segment_axis(&ys);
        let mut cells = Vec::with_capacity(x_axis.len() * y_axis.len());
        for x in &x_axis {
            for y in &y_axis {
                let in_y = grouped.ids(&y.id);
                let candidates = grouped
                    .rows(&x.id)
                    .filter(|row| row_id(row).map_or(false, |id| in_y.contains(id)));
                cells.push(build_cell(&x.id, &y.id, candidates, request.cell_limit, &request.lang));
            }
        }

        Ok(MatrixResponse {
            mode: request.mode,
            perspective: None,
            stats: stats(&cells, request.cell_limit),
            x_axis,
            y_axis,
            cells,
        })
    }

    async fn segment_by_perspective(
        &self,
        request: &MatrixRequest,
        perspective: Perspective,
    ) -> ViewResult<MatrixResponse> {
        let segments = self
            .structure
            .find_segments_by_id(&request.cluster_id, &request.lang)
            .await?;
        let ids = segments.iter().map(|s| s.base.id.clone()).collect();
        let rows = self.segment_contents(ids, request).await?;
        let grouped = Grouped::new(&rows, "segmentId");

        let x_axis = segment_axis(&segments);
        Ok(self.bucketed(request, perspective, x_axis, &grouped))
    }

    async fn role_by_perspective(
        &self,
        request: &MatrixRequest,
        perspective: Perspective,
    ) -> ViewResult<MatrixResponse> {
        let cluster = ReadQuery::NodeById {
            id: request.cluster_id.clone(),
        };
        let roles = ReadQuery::NodesById {
            ids: request.x_ids.clone(),
        };
        let contents = ReadQuery::RoleContents {
            role_ids: request.x_ids.clone(),
            cluster_id: request.cluster_id.clone(),
            types: request.content_types.clone(),
        };

        let (cluster_rows, (role_rows, rows)) = try_join(
            self.reader.run_read_query(&cluster, &request.lang),
            try_join(
                self.reader.run_read_query(&roles, &request.lang),
                self.reader.run_read_query(&contents, &request.lang),
            ),
        )
        .await?;
        let is_cluster = cluster_rows
            .first()
            .and_then(|row| row.get("type"))
            .and_then(Value::as_str)
            .and_then(AssetType::parse)
            == Some(AssetType::Cluster);
        if !is_cluster {
            return Err(ViewError::not_found("Cluster", &request.cluster_id));
        }

        let names: HashMap<&str, &str> = role_rows
            .iter()
            .filter_map(|row| Some((row_id(row)?, row.get("name")?.as_str()?)))
            .collect();
        let x_axis = request
            .x_ids
            .iter()
            .map(|id| {
                let label = match names.get(id.as_str()) {
                    Some(name) => name.to_string(),
                    None => {
                        debug!("Role '{}' not found; labelling axis entry with its id", id);
                        id.clone()
                    }
                };
                AxisEntry {
                    id: id.clone(),
                    key: "ROLE".to_string(),
                    label,
                }
            })
            .collect();

        let grouped = Grouped::new(&rows, "roleId");
        Ok(self.bucketed(request, perspective, x_axis, &grouped))
    }

    fn bucketed(
        &self,
        request: &MatrixRequest,
        perspective: Perspective,
        x_axis: Vec<AxisEntry>,
        grouped: &Grouped<'_>,
    ) -> MatrixResponse {
        let y_axis = bucket_axis(perspective);
        let mut cells = Vec::with_capacity(x_axis.len() * y_axis.len());
        for x in &x_axis {
            for y in &y_axis {
                let candidates = grouped
                    .rows(&x.id)
                    .filter(|row| perspective.bucket_of(row) == Some(y.id.as_str()));
                cells.push(build_cell(&x.id, &y.id, candidates, request.cell_limit, &request.lang));
            }
        }
        MatrixResponse {
            mode: request.mode,
            perspective: Some(perspective),
            stats: stats(&cells, request.cell_limit),
            x_axis,
            y_axis,
            cells,
        }
    }
}
