//! Planar geometry for boundary measurement.
//!
//! Purpose
//! - Put the dataset into a metric plane (`proj`), sanitize polygon topology
//!   (`repair`), and measure perimeters and shared borders (`boundary`) with
//!   explicit tolerances (`GeomCfg`).
//!
//! All lengths downstream are meters; ratios cancel the projection's constant
//! scale factor.

pub mod boundary;
pub mod proj;
pub mod repair;

pub use boundary::{Boundary, GeomCfg};
pub use proj::{utm_zone, TransverseMercator};
pub use repair::{coords_finite, repair, RepairFailure};
