//! Topology repair for input polygons.
//!
//! Source polygons are occasionally self-intersecting or carry degenerate
//! rings. `repair` re-normalizes them through a boolean self-union (the
//! planar analogue of the classic zero-distance buffer) before any length is
//! measured. The operation is idempotent and shape-preserving up to the
//! overlay engine's tolerance; anything it cannot rebuild is reported, never
//! silently emptied.

use geo::{BooleanOps, CoordsIter, LineString, MultiPolygon, Polygon, Validation};

/// Why a geometry could not be repaired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepairFailure {
    /// A coordinate is NaN or infinite.
    NonFinite,
    /// Nothing areal survives sanitation.
    Degenerate,
}

impl std::fmt::Display for RepairFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepairFailure::NonFinite => write!(f, "non-finite coordinate"),
            RepairFailure::Degenerate => write!(f, "degenerate geometry"),
        }
    }
}

/// True iff every coordinate of `geometry` is finite.
pub fn coords_finite(geometry: &MultiPolygon<f64>) -> bool {
    geometry
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

fn ring_usable(ring: &LineString<f64>) -> bool {
    ring.0.len() >= 4
}

/// Repair `geometry` into a valid multipolygon, or report why it cannot be.
///
/// Valid input passes through unchanged apart from dropped degenerate rings;
/// invalid input is rebuilt by unioning the geometry with itself, which
/// resolves self-intersections and duplicate rings without materially moving
/// the boundary.
pub fn repair(geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, RepairFailure> {
    if !coords_finite(geometry) {
        return Err(RepairFailure::NonFinite);
    }
    let sane: Vec<Polygon<f64>> = geometry
        .0
        .iter()
        .filter_map(|polygon| {
            if !ring_usable(polygon.exterior()) {
                return None;
            }
            let interiors: Vec<LineString<f64>> = polygon
                .interiors()
                .iter()
                .filter(|ring| ring_usable(ring))
                .cloned()
                .collect();
            Some(Polygon::new(polygon.exterior().clone(), interiors))
        })
        .collect();
    if sane.is_empty() {
        return Err(RepairFailure::Degenerate);
    }
    let sane = MultiPolygon::new(sane);
    if sane.is_valid() {
        return Ok(sane);
    }
    let rebuilt = sane.union(&sane);
    if rebuilt.0.is_empty() {
        return Err(RepairFailure::Degenerate);
    }
    Ok(rebuilt)
}
