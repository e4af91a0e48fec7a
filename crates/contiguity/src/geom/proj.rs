//! WGS84 transverse Mercator (UTM) forward projection.
//!
//! Krüger series in the third flattening `n`, truncated at n³; the easting
//! and northing error stays far below the overlap tolerances used downstream.
//! Lengths only ever feed perimeter ratios, so the constant UTM scale `k0`
//! cancels out of every weight.

use geo::Coord;

/// Equatorial radius (WGS84, meters).
const WGS84_A: f64 = 6_378_137.0;
/// Flattening (WGS84).
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM central-meridian scale factor.
const UTM_K0: f64 = 0.9996;
/// UTM false easting (meters).
const UTM_FALSE_EASTING: f64 = 500_000.0;
/// UTM false northing for the southern hemisphere (meters).
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Forward transverse Mercator projection: lon/lat degrees to
/// easting/northing meters.
#[derive(Clone, Copy, Debug)]
pub struct TransverseMercator {
    lon0_rad: f64,
    false_northing: f64,
    /// First eccentricity.
    e: f64,
    /// Rectifying radius scaled by k0.
    a_rect: f64,
    alpha: [f64; 3],
}

impl TransverseMercator {
    /// Projection for the given UTM zone (clamped to 1..=60), southern
    /// variant iff `south`.
    pub fn utm(zone: u8, south: bool) -> Self {
        let zone = zone.clamp(1, 60);
        let lon0 = f64::from(zone) * 6.0 - 183.0;
        let f = WGS84_F;
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;
        let big_a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        Self {
            lon0_rad: lon0.to_radians(),
            false_northing: if south { UTM_FALSE_NORTHING_SOUTH } else { 0.0 },
            e: (f * (2.0 - f)).sqrt(),
            a_rect: UTM_K0 * big_a,
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
        }
    }

    /// Projection zoned from a representative lon/lat (degrees), e.g. a
    /// dataset's bounding-box center. Must be applied uniformly to the whole
    /// subset so that every length lives in the same plane.
    pub fn utm_for_point(lon: f64, lat: f64) -> Self {
        Self::utm(utm_zone(lon), lat < 0.0)
    }

    /// Project one lon/lat coordinate (degrees).
    ///
    /// Output components are non-finite for inputs outside the projection's
    /// domain (poles, antipodal meridian); callers must screen for that.
    pub fn project(&self, c: Coord<f64>) -> Coord<f64> {
        let lat = c.y.to_radians();
        let lon = c.x.to_radians() - self.lon0_rad;
        let t = (lat.sin().atanh() - self.e * (self.e * lat.sin()).atanh()).sinh();
        let xi_p = t.atan2(lon.cos());
        let eta_p = (lon.sin() / t.hypot(lon.cos())).asinh();
        let mut easting = eta_p;
        let mut northing = xi_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            easting += a * (k * xi_p).cos() * (k * eta_p).sinh();
            northing += a * (k * xi_p).sin() * (k * eta_p).cosh();
        }
        Coord {
            x: UTM_FALSE_EASTING + self.a_rect * easting,
            y: self.false_northing + self.a_rect * northing,
        }
    }
}

/// UTM zone number for a longitude in degrees.
pub fn utm_zone(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / 6.0).floor() as i64 + 1;
    zone.clamp(1, 60) as u8
}
