//! Geographic coordinate type and spatial utilities.
//!
//! `Coordinate` stores WGS-84 longitude/latitude as `f64` so that values
//! survive serialization bit-for-bit and tile math near boundaries stays
//! exact.  Elevation is optional and single-precision.

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate with optional elevation in metres.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
    pub elevation: Option<f32>,
}

impl Coordinate {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, elevation: None }
    }

    #[inline]
    pub fn with_elevation(lon: f64, lat: f64, elevation: f32) -> Self {
        Self { lon, lat, elevation: Some(elevation) }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Move `meters` east and north of this point (small-distance
    /// approximation; good to well under 1 % below ~100 km).
    pub fn offset_m(self, east_m: f64, north_m: f64) -> Coordinate {
        let d_lat = (north_m / EARTH_RADIUS_M).to_degrees();
        let d_lon = (east_m / (EARTH_RADIUS_M * self.lat.to_radians().cos())).to_degrees();
        Coordinate { lon: self.lon + d_lon, lat: self.lat + d_lat, elevation: self.elevation }
    }

    /// Linear interpolation between two points, `t` in `[0, 1]`.
    pub fn lerp(self, other: Coordinate, t: f64) -> Coordinate {
        let elevation = match (self.elevation, other.elevation) {
            (Some(a), Some(b)) => Some(a + (b - a) * t as f32),
            _ => None,
        };
        Coordinate {
            lon: self.lon + (other.lon - self.lon) * t,
            lat: self.lat + (other.lat - self.lat) * t,
            elevation,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.elevation {
            Some(e) => write!(f, "({:.7}, {:.7}, {e:.1}m)", self.lon, self.lat),
            None => write!(f, "({:.7}, {:.7})", self.lon, self.lat),
        }
    }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// An axis-aligned lon/lat rectangle (`min` = south-west, `max` = north-east).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl BoundingBox {
    /// Build from two corners in any order.
    pub fn new(a: Coordinate, b: Coordinate) -> Self {
        Self {
            min: Coordinate::new(a.lon.min(b.lon), a.lat.min(b.lat)),
            max: Coordinate::new(a.lon.max(b.lon), a.lat.max(b.lat)),
        }
    }

    /// Square box extending `radius_m` in every direction from `center`.
    pub fn around(center: Coordinate, radius_m: f64) -> Self {
        let sw = center.offset_m(-radius_m, -radius_m);
        let ne = center.offset_m(radius_m, radius_m);
        Self::new(sw, ne)
    }

    #[inline]
    pub fn contains(&self, c: Coordinate) -> bool {
        c.lon >= self.min.lon && c.lon <= self.max.lon
            && c.lat >= self.min.lat && c.lat <= self.max.lat
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.lon <= other.max.lon && other.min.lon <= self.max.lon
            && self.min.lat <= other.max.lat && other.min.lat <= self.max.lat
    }

    pub fn center(&self) -> Coordinate {
        self.min.lerp(self.max, 0.5)
    }
}

// ── Polylines ─────────────────────────────────────────────────────────────────

/// Total haversine length of a polyline in metres.
pub fn line_length_m(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}

/// The point at `fraction` (0..=1) of the way along a polyline, measured by
/// distance.  Returns `(point, index)` where `index` is the segment the point
/// falls on.
///
/// # Panics
/// Panics if `points` is empty.
pub fn point_along_line(points: &[Coordinate], fraction: f64) -> (Coordinate, usize) {
    if points.len() == 1 {
        return (points[0], 0);
    }
    let total = line_length_m(points);
    if total <= 0.0 || fraction <= 0.0 {
        return (points[0], 0);
    }
    if fraction >= 1.0 {
        return (points[points.len() - 1], points.len() - 2);
    }
    let target = total * fraction.min(1.0);

    let mut walked = 0.0;
    for (i, w) in points.windows(2).enumerate() {
        let len = w[0].distance_m(w[1]);
        if walked + len >= target && len > 0.0 {
            return (w[0].lerp(w[1], (target - walked) / len), i);
        }
        walked += len;
    }
    (points[points.len() - 1], points.len() - 2)
}

/// Project `p` onto segment `a`→`b` in a local equirectangular frame.
///
/// Returns the projected point and its parameter `t` in `[0, 1]`.
pub fn project_on_segment(p: Coordinate, a: Coordinate, b: Coordinate) -> (Coordinate, f64) {
    let scale = a.lat.to_radians().cos();
    let (ax, ay) = (a.lon * scale, a.lat);
    let (bx, by) = (b.lon * scale, b.lat);
    let (px, py) = (p.lon * scale, p.lat);

    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (a, 0.0);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0);
    (a.lerp(b, t), t)
}
