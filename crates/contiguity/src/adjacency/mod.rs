//! Weighted adjacency construction over one group's units.
//!
//! Project → repair → measure → index → query. Candidate pairs come from an
//! R-tree over unit bounding boxes; true adjacency additionally requires a
//! strictly positive shared boundary length, so bounding-box contact and
//! single-point touches never create edges. Weights are normalized by the
//! owning unit's own perimeter, so one border generally yields two different
//! weights.

use geo::{BoundingRect, MapCoords, MultiPolygon};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::dataset::UnitRecord;
use crate::geom::{coords_finite, repair, Boundary, GeomCfg, RepairFailure, TransverseMercator};
use crate::graph::Neighbor;

/// Coordinate system of the input dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoordSystem {
    /// Geographic lon/lat degrees (WGS84); projected to UTM before any
    /// length is measured.
    #[default]
    Geographic,
    /// Already planar with metric units; used as-is.
    Planar,
}

/// Builder configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildCfg {
    pub coord_system: CoordSystem,
    pub geom: GeomCfg,
}

/// Why a unit was excluded from edge computation. It still becomes a node;
/// its adjacency list stays empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exclusion {
    /// Projected coordinates are not finite.
    Projection,
    /// Geometry could not be repaired.
    Geometry(RepairFailure),
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exclusion::Projection => write!(f, "projection produced non-finite coordinates"),
            Exclusion::Geometry(failure) => write!(f, "unrepairable geometry: {failure}"),
        }
    }
}

/// Per-group build diagnostics.
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    /// Units excluded from adjacency, with reasons.
    pub excluded: Vec<(i64, Exclusion)>,
    /// Units that ended with no neighbors. Expected for islands and for
    /// units whose true neighbor lies outside the processed group.
    pub isolated: Vec<i64>,
}

struct Prepared {
    geometry: MultiPolygon<f64>,
    boundary: Boundary,
    perimeter: f64,
}

/// Build adjacency lists indexed by `unit_no - 1`, plus diagnostics.
///
/// `units` must already carry unit numbers exactly 1..=N (see
/// `GroupSubset::check_unit_numbering`); ids in the output come from the
/// unit-number attribute, never from the slice position.
pub fn build_adjacency(units: &[UnitRecord], cfg: &BuildCfg) -> (Vec<Vec<Neighbor>>, BuildReport) {
    let n = units.len();
    let mut adjacency: Vec<Vec<Neighbor>> = vec![Vec::new(); n];
    let mut report = BuildReport::default();
    tracing::debug!(units = n, "building adjacency");

    // Stages 1-3: uniform projection, per-unit repair, perimeters. Failures
    // exclude the unit but keep its node slot.
    let projected = project_all(units, cfg.coord_system, &mut report);
    let mut prepared: Vec<Option<Prepared>> = Vec::with_capacity(n);
    for (unit, geometry) in units.iter().zip(projected) {
        let Some(geometry) = geometry else {
            prepared.push(None);
            continue;
        };
        match repair(&geometry) {
            Ok(clean) => {
                let boundary = Boundary::of(&clean);
                let perimeter = boundary.length();
                if perimeter > 0.0 {
                    prepared.push(Some(Prepared {
                        geometry: clean,
                        boundary,
                        perimeter,
                    }));
                } else {
                    report
                        .excluded
                        .push((unit.unit_no, Exclusion::Geometry(RepairFailure::Degenerate)));
                    prepared.push(None);
                }
            }
            Err(failure) => {
                report
                    .excluded
                    .push((unit.unit_no, Exclusion::Geometry(failure)));
                prepared.push(None);
            }
        }
    }

    // Stage 4: R-tree over bounding boxes of the prepared units.
    let tree = RTree::bulk_load(
        prepared
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let rect = slot.as_ref()?.geometry.bounding_rect()?;
                Some(GeomWithData::new(
                    Rectangle::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    index,
                ))
            })
            .collect(),
    );

    // Stage 5: envelope query per unit, exact shared length per candidate.
    for (i, slot) in prepared.iter().enumerate() {
        let Some(prep) = slot.as_ref() else { continue };
        let Some(rect) = prep.geometry.bounding_rect() else {
            continue;
        };
        let pad = cfg.geom.eps_perp;
        let envelope = AABB::from_corners(
            [rect.min().x - pad, rect.min().y - pad],
            [rect.max().x + pad, rect.max().y + pad],
        );
        let owner = units[i].unit_no;
        debug_assert!(owner >= 1 && owner as usize <= n);
        for candidate in tree.locate_in_envelope_intersecting(&envelope) {
            let j = candidate.data;
            if j == i {
                continue;
            }
            let Some(other) = prepared[j].as_ref() else {
                continue;
            };
            let shared = prep.boundary.shared_with(&other.boundary, &cfg.geom);
            if shared > 0.0 {
                adjacency[(owner - 1) as usize].push(Neighbor {
                    id: units[j].unit_no,
                    shared_perim: shared / prep.perimeter,
                });
            }
        }
    }
    for list in &mut adjacency {
        list.sort_by_key(|neighbor| neighbor.id);
    }

    // Stage 6: empty lists are a warning, not an error. Excluded units are
    // already reported, so they do not double as isolated.
    for unit in units {
        let slot = (unit.unit_no - 1) as usize;
        let empty = adjacency.get(slot).is_some_and(Vec::is_empty);
        let was_excluded = report.excluded.iter().any(|(id, _)| *id == unit.unit_no);
        if empty && !was_excluded {
            report.isolated.push(unit.unit_no);
        }
    }

    (adjacency, report)
}

/// Stage 1: uniform projection of the whole subset. `None` marks a unit
/// whose projected coordinates are not finite.
fn project_all(
    units: &[UnitRecord],
    coord_system: CoordSystem,
    report: &mut BuildReport,
) -> Vec<Option<MultiPolygon<f64>>> {
    match coord_system {
        CoordSystem::Planar => units.iter().map(|u| Some(u.geometry.clone())).collect(),
        CoordSystem::Geographic => {
            let Some(center) = subset_center(units) else {
                for unit in units {
                    report.excluded.push((unit.unit_no, Exclusion::Projection));
                }
                return units.iter().map(|_| None).collect();
            };
            let tm = TransverseMercator::utm_for_point(center.x, center.y);
            units
                .iter()
                .map(|unit| {
                    let projected = unit.geometry.map_coords(|c| tm.project(c));
                    if coords_finite(&projected) {
                        Some(projected)
                    } else {
                        report.excluded.push((unit.unit_no, Exclusion::Projection));
                        None
                    }
                })
                .collect()
        }
    }
}

fn subset_center(units: &[UnitRecord]) -> Option<geo::Coord<f64>> {
    let mut merged: Option<geo::Rect<f64>> = None;
    for unit in units {
        let Some(rect) = unit.geometry.bounding_rect() else {
            continue;
        };
        if !rect.min().x.is_finite() || !rect.max().y.is_finite() {
            continue;
        }
        merged = Some(match merged {
            None => rect,
            Some(acc) => geo::Rect::new(
                geo::Coord {
                    x: acc.min().x.min(rect.min().x),
                    y: acc.min().y.min(rect.min().y),
                },
                geo::Coord {
                    x: acc.max().x.max(rect.max().x),
                    y: acc.max().y.max(rect.max().y),
                },
            ),
        });
    }
    merged.map(|rect| rect.center())
}
