//! Boundary measurement: perimeters and shared-border lengths.
//!
//! The shared border of two adjacent region polygons is a union of collinear
//! segment overlaps; transversal crossings and single-point touches have zero
//! one-dimensional measure and must not create adjacency. The solver works on
//! flattened ring segments with per-segment boxes for cheap rejection.
//! `nalgebra` vectors carry the arithmetic, converted at the module boundary.

use geo::{LineString, MultiPolygon};
use nalgebra::Vector2;

/// Tolerances for boundary measurement (meters, post-projection).
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    /// Segments shorter than this are ignored.
    pub eps_len: f64,
    /// Maximum perpendicular offset for two segments to count as collinear.
    pub eps_perp: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_len: 1e-9,
            eps_perp: 1e-6,
        }
    }
}

#[inline]
fn to_vec(c: geo::Coord<f64>) -> Vector2<f64> {
    Vector2::new(c.x, c.y)
}

/// One boundary segment with its loose bounding box.
#[derive(Clone, Copy, Debug)]
struct Seg {
    p: Vector2<f64>,
    q: Vector2<f64>,
    lo: Vector2<f64>,
    hi: Vector2<f64>,
}

/// Flattened boundary (all exterior and interior rings) of one unit.
#[derive(Clone, Debug, Default)]
pub struct Boundary {
    segs: Vec<Seg>,
}

impl Boundary {
    pub fn of(geometry: &MultiPolygon<f64>) -> Self {
        let mut segs = Vec::new();
        for polygon in &geometry.0 {
            push_ring(&mut segs, polygon.exterior());
            for ring in polygon.interiors() {
                push_ring(&mut segs, ring);
            }
        }
        Self { segs }
    }

    /// Total boundary length (the unit's own perimeter).
    pub fn length(&self) -> f64 {
        self.segs.iter().map(|s| (s.q - s.p).norm()).sum()
    }

    /// Length of this boundary's overlap with `other`: collinear portions
    /// only, crossings and point touches contribute nothing.
    pub fn shared_with(&self, other: &Boundary, cfg: &GeomCfg) -> f64 {
        let mut total = 0.0;
        for a in &self.segs {
            for b in &other.segs {
                if boxes_apart(a, b, cfg.eps_perp) {
                    continue;
                }
                total += collinear_overlap(a, b, cfg);
            }
        }
        total
    }
}

fn push_ring(segs: &mut Vec<Seg>, ring: &LineString<f64>) {
    for pair in ring.0.windows(2) {
        let p = to_vec(pair[0]);
        let q = to_vec(pair[1]);
        segs.push(Seg {
            p,
            q,
            lo: p.inf(&q),
            hi: p.sup(&q),
        });
    }
}

#[inline]
fn boxes_apart(a: &Seg, b: &Seg, eps: f64) -> bool {
    a.hi.x < b.lo.x - eps
        || b.hi.x < a.lo.x - eps
        || a.hi.y < b.lo.y - eps
        || b.hi.y < a.lo.y - eps
}

/// Overlap length of segment `b` along segment `a`, zero unless both
/// endpoints of `b` lie within `eps_perp` of `a`'s carrier line.
fn collinear_overlap(a: &Seg, b: &Seg, cfg: &GeomCfg) -> f64 {
    let d = a.q - a.p;
    let len = d.norm();
    if len <= cfg.eps_len {
        return 0.0;
    }
    let u = d / len;
    if u.perp(&(b.p - a.p)).abs() > cfg.eps_perp || u.perp(&(b.q - a.p)).abs() > cfg.eps_perp {
        return 0.0;
    }
    let t0 = u.dot(&(b.p - a.p));
    let t1 = u.dot(&(b.q - a.p));
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    (hi.min(len) - lo.max(0.0)).max(0.0)
}
