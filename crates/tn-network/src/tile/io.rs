//! Tile binary format (version 1).
//!
//! ```text
//! varint version
//! varint tile_id, varint zoom, varint edge_type_map_id
//! varint n, n × vertex       f64 lon, f64 lat, elevation, link first_edge, u8 next_order, link first_turn_cost
//! varint n, n × edge         id, vertex1, vertex2, link next1, link next2, u8 orders (tail << 4 | head),
//!                            varint length_cm, varint edge_type_id, varint shape_start, varint shape_len,
//!                            varint attributes
//! varint n, n × varint       cross edge arena indexes
//! varint n, n × point        f64 lon, f64 lat, elevation
//! varint n, n × attributes   attribute sets (set 0 is the empty set)
//! varint n, n × table        varint vertex, varint type_id, u8 dimension, dimension² × varint, link next
//! ```
//!
//! Ids are two varints (`tile_id`, `local_id`); links are written as
//! `link + 1` with `0` for "none"; elevation is `u8 flag [f32]`.

use std::io::{Read, Write};

use tn_core::codec::{self, ReadExt, WriteExt};
use tn_core::{CoreError, Coordinate, EdgeId, VertexId};

use super::turn_costs::TurnCostTable;
use super::{EdgeRecord, NO_LINK, NetworkTile, VertexRecord, pack_orders, unpack_orders};
use crate::NetworkResult;

pub const TILE_VERSION: u64 = 1;

/// Upper bound on any element count read from a stream.
const MAX_COUNT: u64 = 1 << 32;

impl NetworkTile {
    /// Write this tile to `writer`.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> NetworkResult<()> {
        writer.write_varint(TILE_VERSION)?;
        writer.write_varint(self.tile_id as u64)?;
        writer.write_varint(self.zoom as u64)?;
        writer.write_varint(self.edge_type_map_id as u64)?;

        writer.write_varint(self.vertices.len() as u64)?;
        for v in &self.vertices {
            write_coordinate(writer, v.location)?;
            write_link(writer, v.first_edge)?;
            writer.write_u8(v.next_order)?;
            write_link(writer, v.first_turn_cost)?;
        }

        writer.write_varint(self.edges.len() as u64)?;
        for e in &self.edges {
            write_id(writer, e.id.tile_id, e.id.local_id)?;
            write_id(writer, e.vertex1.tile_id, e.vertex1.local_id)?;
            write_id(writer, e.vertex2.tile_id, e.vertex2.local_id)?;
            write_link(writer, e.next1)?;
            write_link(writer, e.next2)?;
            writer.write_u8(pack_orders(e.tail_order, e.head_order))?;
            writer.write_varint(e.length_cm as u64)?;
            writer.write_varint(e.edge_type_id as u64)?;
            writer.write_varint(e.shape_start as u64)?;
            writer.write_varint(e.shape_len as u64)?;
            writer.write_varint(e.attributes as u64)?;
        }

        writer.write_varint(self.cross_edges.len() as u64)?;
        for &index in &self.cross_edges {
            writer.write_varint(index as u64)?;
        }

        writer.write_varint(self.shape_points.len() as u64)?;
        for &p in &self.shape_points {
            write_coordinate(writer, p)?;
        }

        writer.write_varint(self.attribute_sets.len() as u64)?;
        for set in &self.attribute_sets {
            writer.write_attributes(set)?;
        }

        writer.write_varint(self.turn_costs.len() as u64)?;
        for t in &self.turn_costs {
            writer.write_varint(t.vertex as u64)?;
            writer.write_varint(t.type_id as u64)?;
            writer.write_u8(t.dimension)?;
            for &c in &t.costs {
                writer.write_varint(c as u64)?;
            }
            write_link(writer, t.next)?;
        }
        Ok(())
    }

    /// Read a tile written by [`write_to`](Self::write_to).
    ///
    /// Fails with an invalid-data error on an unknown version or on internal
    /// references that point outside the tile's arrays.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> NetworkResult<Self> {
        codec::expect_version("tile", reader.read_varint()?, TILE_VERSION)?;
        let tile_id = reader.read_varint_u32()?;
        let zoom = reader.read_varint_u32()?;
        tn_core::tiles::check_zoom(zoom)?;
        let edge_type_map_id = reader.read_varint_u32()?;

        let mut tile = NetworkTile::new(tile_id, zoom);
        tile.edge_type_map_id = edge_type_map_id;

        let count = read_count(reader)?;
        tile.vertices.reserve(count.min(1 << 16));
        for _ in 0..count {
            let location = read_coordinate(reader)?;
            let first_edge = read_link(reader)?;
            let next_order = reader.read_u8()?;
            let first_turn_cost = read_link(reader)?;
            tile.vertices.push(VertexRecord { location, first_edge, next_order, first_turn_cost });
        }

        let count = read_count(reader)?;
        tile.edges.reserve(count.min(1 << 16));
        for _ in 0..count {
            let (t, l) = read_id(reader)?;
            let id = EdgeId::new(t, l);
            let (t, l) = read_id(reader)?;
            let vertex1 = VertexId::new(t, l);
            let (t, l) = read_id(reader)?;
            let vertex2 = VertexId::new(t, l);
            let next1 = read_link(reader)?;
            let next2 = read_link(reader)?;
            let (tail_order, head_order) = unpack_orders(reader.read_u8()?);
            tile.edges.push(EdgeRecord {
                id,
                vertex1,
                vertex2,
                next1,
                next2,
                tail_order,
                head_order,
                length_cm: reader.read_varint_u32()?,
                edge_type_id: reader.read_varint_u32()?,
                shape_start: reader.read_varint_u32()?,
                shape_len: reader.read_varint_u32()?,
                attributes: reader.read_varint_u32()?,
            });
        }

        let count = read_count(reader)?;
        for _ in 0..count {
            tile.cross_edges.push(reader.read_varint_u32()?);
        }

        let count = read_count(reader)?;
        for _ in 0..count {
            tile.shape_points.push(read_coordinate(reader)?);
        }

        let count = read_count(reader)?;
        tile.attribute_sets.clear();
        for _ in 0..count {
            tile.attribute_sets.push(reader.read_attributes()?);
        }

        let count = read_count(reader)?;
        for _ in 0..count {
            let vertex = reader.read_varint_u32()?;
            let type_id = reader.read_varint_u32()?;
            let dimension = reader.read_u8()?;
            let cells = dimension as usize * dimension as usize;
            let costs = (0..cells)
                .map(|_| reader.read_varint_u32())
                .collect::<Result<Vec<_>, _>>()?;
            let next = read_link(reader)?;
            tile.turn_costs.push(TurnCostTable { vertex, type_id, dimension, costs, prefix: Vec::new(), next });
        }

        tile.validate()?;
        tile.rebuild_lookups();
        Ok(tile)
    }

    /// Check that every internal reference stays inside the arrays.
    fn validate(&self) -> Result<(), CoreError> {
        let edge_links = (self.edges.len() as u64) << 1;
        let link_ok = |link: u32| link == NO_LINK || (link as u64) < edge_links;
        let table_ok = |link: u32| link == NO_LINK || (link as usize) < self.turn_costs.len();

        let invalid = |what: &str| Err(CoreError::InvalidData(format!("tile {}: {what}", self.tile_id)));

        if self.attribute_sets.first().is_none_or(|s| !s.is_empty()) {
            return invalid("attribute set 0 must be empty");
        }
        for v in &self.vertices {
            if !link_ok(v.first_edge) || !table_ok(v.first_turn_cost) {
                return invalid("vertex link out of range");
            }
        }
        for e in &self.edges {
            let shape_end = e.shape_start as u64 + e.shape_len as u64;
            if !link_ok(e.next1)
                || !link_ok(e.next2)
                || shape_end > self.shape_points.len() as u64
                || e.attributes as usize >= self.attribute_sets.len()
            {
                return invalid("edge reference out of range");
            }
        }
        if self.cross_edges.iter().any(|&i| i as usize >= self.edges.len()) {
            return invalid("cross edge index out of range");
        }
        for t in &self.turn_costs {
            if !table_ok(t.next) || t.vertex as usize >= self.vertices.len() {
                return invalid("turn cost table reference out of range");
            }
        }
        Ok(())
    }
}

fn write_link<W: Write + ?Sized>(writer: &mut W, link: u32) -> NetworkResult<()> {
    let value = if link == NO_LINK { 0 } else { link as u64 + 1 };
    writer.write_varint(value)?;
    Ok(())
}

fn read_link<R: Read + ?Sized>(reader: &mut R) -> NetworkResult<u32> {
    match reader.read_varint()? {
        0 => Ok(NO_LINK),
        v if v <= NO_LINK as u64 => Ok((v - 1) as u32),
        v => Err(CoreError::InvalidData(format!("link {v} out of range")).into()),
    }
}

fn write_id<W: Write + ?Sized>(writer: &mut W, tile_id: u32, local_id: u32) -> NetworkResult<()> {
    writer.write_varint(tile_id as u64)?;
    writer.write_varint(local_id as u64)?;
    Ok(())
}

fn read_id<R: Read + ?Sized>(reader: &mut R) -> NetworkResult<(u32, u32)> {
    Ok((reader.read_varint_u32()?, reader.read_varint_u32()?))
}

pub(crate) fn write_coordinate<W: Write + ?Sized>(writer: &mut W, c: Coordinate) -> NetworkResult<()> {
    writer.write_f64(c.lon)?;
    writer.write_f64(c.lat)?;
    match c.elevation {
        Some(e) => {
            writer.write_u8(1)?;
            writer.write_f32(e)?;
        }
        None => writer.write_u8(0)?,
    }
    Ok(())
}

pub(crate) fn read_coordinate<R: Read + ?Sized>(reader: &mut R) -> NetworkResult<Coordinate> {
    let lon = reader.read_f64()?;
    let lat = reader.read_f64()?;
    let elevation = match reader.read_u8()? {
        0 => None,
        1 => Some(reader.read_f32()?),
        flag => return Err(CoreError::InvalidData(format!("invalid elevation flag {flag}")).into()),
    };
    Ok(Coordinate { lon, lat, elevation })
}

pub(crate) fn read_count<R: Read + ?Sized>(reader: &mut R) -> NetworkResult<usize> {
    let count = reader.read_varint()?;
    if count > MAX_COUNT {
        return Err(CoreError::InvalidData(format!("element count {count} is implausible")).into());
    }
    Ok(count as usize)
}
