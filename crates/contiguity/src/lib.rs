//! Shared-border adjacency graphs for polygonal region datasets.
//!
//! Purpose
//! - Load a polygon dataset (GeoJSON features with attribute columns), select
//!   one group of units, and derive the graph of units whose boundaries share
//!   a physical border, each edge weighted by the fraction of the owning
//!   unit's perimeter that the border covers.
//! - Keep the geometry numerically explicit: a planar metric projection is
//!   applied before any length is measured, and every overlap test carries an
//!   eps from `GeomCfg`.
//!
//! Pipeline
//! - `dataset` loads and filters records, `geom` projects/repairs/measures,
//!   `adjacency` builds weighted neighbor lists, `graph` validates and writes
//!   the artifact, `run` orchestrates one batch of groups.

pub mod adjacency;
pub mod dataset;
pub mod error;
pub mod geom;
pub mod graph;
pub mod run;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::adjacency::{build_adjacency, BuildCfg, BuildReport, CoordSystem};
    pub use crate::dataset::schema::{resolve_subgroup_columns, SubgroupColumns};
    pub use crate::dataset::{ColumnSpec, Dataset, GroupInfo, GroupSubset, UnitRecord};
    pub use crate::error::Error;
    pub use crate::geom::{repair, Boundary, GeomCfg, TransverseMercator};
    pub use crate::graph::{Graph, Neighbor, Node};
    pub use crate::run::{process_groups, GroupSpec, GroupSummary, RunCfg};
}
