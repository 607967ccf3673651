//! Slippy-map tile addressing.
//!
//! A tile is `(x, y, zoom)`; its **local id** is `x + y * 2^zoom`.  Every
//! vertex and edge id in a network embeds the local id of its tile at the
//! network zoom, so these conversions sit on every lookup path and are kept
//! free of allocation.
//!
//! ```text
//! x = floor((lon + 180) / 360 * 2^zoom)
//! y = floor((1 - ln(tan(lat) + sec(lat)) / π) / 2 * 2^zoom)
//! ```
//!
//! Zoom 0 yields a single tile covering the planet.

use std::f64::consts::PI;
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::geo::{BoundingBox, Coordinate};

/// Highest supported zoom: `4^16` tiles still fit a `u32` local id.
pub const MAX_ZOOM: u32 = 16;

/// Latitude limit of the Web-Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// A tile coordinate at a given zoom.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub zoom: u32,
}

impl Tile {
    /// Construct a tile, validating that `x` and `y` fit the zoom level.
    pub fn new(x: u32, y: u32, zoom: u32) -> CoreResult<Self> {
        check_zoom(zoom)?;
        let size = tile_count_per_axis(zoom);
        if x as u64 >= size || y as u64 >= size {
            return Err(CoreError::TileOutOfRange { x, y, zoom });
        }
        Ok(Self { x, y, zoom })
    }

    /// The tile containing `(lon, lat)` at `zoom`.
    ///
    /// Coordinates outside the Mercator range are clamped to the edge tiles.
    pub fn world_to_tile(lon: f64, lat: f64, zoom: u32) -> Self {
        let n = tile_count_per_axis(zoom) as f64;
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

        let x = ((lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        Self {
            x: x.clamp(0.0, max) as u32,
            y: y.clamp(0.0, max) as u32,
            zoom,
        }
    }

    /// Top-left corner of the tile as `(lon, lat)`.
    pub fn to_world(self) -> (f64, f64) {
        tile_corner(self.x as f64, self.y as f64, self.zoom)
    }

    /// Geographic extent of this tile.
    pub fn bounding_box(self) -> BoundingBox {
        let (left, top) = tile_corner(self.x as f64, self.y as f64, self.zoom);
        let (right, bottom) = tile_corner(self.x as f64 + 1.0, self.y as f64 + 1.0, self.zoom);
        BoundingBox::new(
            Coordinate::new(left, bottom),
            Coordinate::new(right, top),
        )
    }

    /// `x + y * 2^zoom`.
    #[inline]
    pub fn local_id(self) -> u32 {
        to_local_id(self.x, self.y, self.zoom)
    }

    /// Inverse of [`local_id`](Self::local_id).
    #[inline]
    pub fn from_local_id(local_id: u32, zoom: u32) -> Self {
        let (x, y) = from_local_id(local_id, zoom);
        Self { x, y, zoom }
    }

    /// All tiles at `zoom` overlapping `bbox`, row by row.
    pub fn tiles_in_box(bbox: &BoundingBox, zoom: u32) -> TileRange {
        let top_left = Tile::world_to_tile(bbox.min.lon, bbox.max.lat, zoom);
        let bottom_right = Tile::world_to_tile(bbox.max.lon, bbox.min.lat, zoom);
        TileRange {
            left: top_left.x,
            right: bottom_right.x,
            bottom: bottom_right.y,
            zoom,
            x: top_left.x,
            y: top_left.y,
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Iterator over a rectangular block of tiles, see [`Tile::tiles_in_box`].
#[derive(Clone, Debug)]
pub struct TileRange {
    left: u32,
    right: u32,
    bottom: u32,
    zoom: u32,
    x: u32,
    y: u32,
}

impl Iterator for TileRange {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.y > self.bottom || self.left > self.right {
            return None;
        }
        let tile = Tile { x: self.x, y: self.y, zoom: self.zoom };
        if self.x == self.right {
            self.x = self.left;
            self.y += 1;
        } else {
            self.x += 1;
        }
        Some(tile)
    }
}

// ── Free functions ────────────────────────────────────────────────────────────

/// Number of tiles along one axis: `2^zoom`.
#[inline]
pub fn tile_count_per_axis(zoom: u32) -> u64 {
    1u64 << zoom
}

/// Reject zoom levels whose local ids would overflow a `u32`.
pub fn check_zoom(zoom: u32) -> CoreResult<()> {
    if zoom > MAX_ZOOM {
        return Err(CoreError::InvalidZoom(zoom));
    }
    Ok(())
}

/// `x + y * 2^zoom`.
#[inline]
pub fn to_local_id(x: u32, y: u32, zoom: u32) -> u32 {
    (x as u64 + y as u64 * tile_count_per_axis(zoom)) as u32
}

/// Inverse of [`to_local_id`], returns `(x, y)`.
#[inline]
pub fn from_local_id(local_id: u32, zoom: u32) -> (u32, u32) {
    let size = tile_count_per_axis(zoom);
    let id = local_id as u64;
    ((id % size) as u32, (id / size) as u32)
}

/// Local id of the tile containing `(lon, lat)`.
#[inline]
pub fn world_to_local_id(lon: f64, lat: f64, zoom: u32) -> u32 {
    Tile::world_to_tile(lon, lat, zoom).local_id()
}

fn tile_corner(x: f64, y: f64, zoom: u32) -> (f64, f64) {
    let n = tile_count_per_axis(zoom) as f64;
    let lon = x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    (lon, lat)
}
