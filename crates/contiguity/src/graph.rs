//! Graph artifact: node list, adjacency lists, invariant validation, and the
//! atomic JSON write.
//!
//! The artifact has exactly two top-level fields: `nodes` and `adjacency`,
//! where `adjacency[k]` lists the neighbors of the node whose id is `k + 1`.
//! Downstream consumers index on that contract, so it is validated here at
//! construction time, before any bytes hit disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::UnitRecord;
use crate::error::{Error, Result};

/// One unit as emitted in the artifact. `id` is the declared unit number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub name: String,
    pub sub_group_id: Option<i64>,
    pub sub_group_name: Option<String>,
}

/// One weighted neighbor entry. `shared_perim` is shared boundary length
/// divided by the owning unit's own perimeter: normally in (0, 1], slightly
/// above 1 only for degenerate geometry, and asymmetric between the two
/// sides of one border.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: i64,
    pub shared_perim: f64,
}

/// The per-group artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub adjacency: Vec<Vec<Neighbor>>,
}

impl Node {
    pub fn from_unit(unit: &UnitRecord) -> Self {
        Self {
            id: unit.unit_no,
            name: unit.name.clone(),
            sub_group_id: unit.subgroup_code,
            sub_group_name: unit.subgroup_name.clone(),
        }
    }
}

impl Graph {
    /// Assemble and validate: one adjacency slot per node, ids exactly 1..=N
    /// in order, neighbor ids in range, no self-loops, strictly positive
    /// weights.
    pub fn new(nodes: Vec<Node>, adjacency: Vec<Vec<Neighbor>>) -> Result<Self> {
        if nodes.len() != adjacency.len() {
            return Err(Error::InvalidGraph(format!(
                "{} nodes but {} adjacency lists",
                nodes.len(),
                adjacency.len()
            )));
        }
        for (k, node) in nodes.iter().enumerate() {
            let expected = k as i64 + 1;
            if node.id != expected {
                return Err(Error::InvalidGraph(format!(
                    "node at position {k} has id {}, expected {expected}",
                    node.id
                )));
            }
        }
        let n = nodes.len() as i64;
        for (k, neighbors) in adjacency.iter().enumerate() {
            let owner = k as i64 + 1;
            for neighbor in neighbors {
                if neighbor.id == owner {
                    return Err(Error::InvalidGraph(format!(
                        "node {owner} lists itself as a neighbor"
                    )));
                }
                if neighbor.id < 1 || neighbor.id > n {
                    return Err(Error::InvalidGraph(format!(
                        "node {owner} lists unknown neighbor {}",
                        neighbor.id
                    )));
                }
                if !(neighbor.shared_perim > 0.0) {
                    return Err(Error::InvalidGraph(format!(
                        "edge {owner} -> {} has non-positive weight {}",
                        neighbor.id, neighbor.shared_perim
                    )));
                }
            }
        }
        Ok(Self { nodes, adjacency })
    }

    /// Neighbor list for a node id; empty for out-of-range ids.
    pub fn neighbors(&self, id: i64) -> &[Neighbor] {
        usize::try_from(id - 1)
            .ok()
            .and_then(|k| self.adjacency.get(k))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Write the artifact as pretty JSON, atomically: serialize into a
    /// temporary file in the destination directory, then persist to the
    /// final name. A failed run never leaves a partial artifact behind.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| Error::io(dir, source))?;
        let bytes = serde_json::to_vec_pretty(self)?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|source| Error::io(dir, source))?;
        tmp.write_all(&bytes)
            .map_err(|source| Error::io(path, source))?;
        tmp.persist(path)
            .map_err(|persist| Error::io(path, persist.error))?;
        Ok(())
    }
}
