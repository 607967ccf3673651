//! Network and type-index streams.
//!
//! ```text
//! network     varint version, varint zoom, edge-type index, turn-cost-type index,
//!             varint tile count, tile*
//! type index  varint version, varint func id, varint set count, attributes*
//! ```
//!
//! A type index written with a non-identity function can only be read back
//! when the caller supplies a function with the same id: the function itself
//! is code and is not stored.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use tn_core::codec::{self, ReadExt, WriteExt};

use crate::data_use::DataUseNotifier;
use crate::tile::NetworkTile;
use crate::tile::io::read_count;
use crate::types::{AttributeSetIndex, TypeFunc, TypeIndex};
use crate::{NetworkConfig, NetworkError, NetworkResult, RoutingNetwork};

pub const NETWORK_VERSION: u64 = 1;
pub const TYPE_INDEX_VERSION: u64 = 1;

// ── Type index ────────────────────────────────────────────────────────────────

impl TypeIndex {
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> NetworkResult<()> {
        writer.write_varint(TYPE_INDEX_VERSION)?;
        writer.write_varint(self.func_id() as u64)?;
        let sets = self.sets().sets();
        writer.write_varint(sets.len() as u64)?;
        for set in sets {
            writer.write_attributes(set)?;
        }
        Ok(())
    }

    /// Read an index.  `func` must be given, with a matching id, unless the
    /// stored function is the identity.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, func: Option<&TypeFunc>) -> NetworkResult<Self> {
        codec::expect_version("type index", reader.read_varint()?, TYPE_INDEX_VERSION)?;
        let id = reader.read_varint_u32()?;
        let func = match func {
            Some(f) if f.id() == id => f.clone(),
            _ if id == 0 => TypeFunc::identity(),
            _ => return Err(NetworkError::MissingTypeFunc { id }),
        };

        let count = read_count(reader)?;
        let mut sets = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            sets.push(reader.read_attributes()?);
        }
        Ok(TypeIndex::from_parts(func, AttributeSetIndex::from_sets(sets)?))
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Type functions needed to read a network back.
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    pub edge_type_func: Option<TypeFunc>,
    pub turn_cost_type_func: Option<TypeFunc>,
}

impl RoutingNetwork {
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> NetworkResult<()> {
        writer.write_varint(NETWORK_VERSION)?;
        writer.write_varint(self.zoom as u64)?;
        self.edge_types.write_to(writer)?;
        self.turn_cost_types.write_to(writer)?;

        let tiles: Vec<&NetworkTile> = self.tiles().collect();
        writer.write_varint(tiles.len() as u64)?;
        for tile in &tiles {
            tile.write_to(writer)?;
        }
        Ok(())
    }

    /// Read a network written by [`write_to`](Self::write_to).
    ///
    /// The network gets its own, empty data-use notifier.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, options: &ReadOptions) -> NetworkResult<Self> {
        codec::expect_version("network", reader.read_varint()?, NETWORK_VERSION)?;
        let zoom = reader.read_varint_u32()?;
        NetworkConfig::with_zoom(zoom).validate()?;
        let edge_types = TypeIndex::read_from(reader, options.edge_type_func.as_ref())?;
        let turn_cost_types = TypeIndex::read_from(reader, options.turn_cost_type_func.as_ref())?;

        let usage = Arc::new(DataUseNotifier::new());
        let mut network = RoutingNetwork::with_parts(zoom, edge_types, turn_cost_types, usage);
        let count = read_count(reader)?;
        for _ in 0..count {
            let tile = NetworkTile::read_from(reader)?;
            if tile.zoom() != zoom {
                return Err(tn_core::CoreError::InvalidData(format!(
                    "tile {} has zoom {}, network has zoom {zoom}",
                    tile.tile_id(),
                    tile.zoom()
                ))
                .into());
            }
            network.insert_tile(tile)?;
        }
        Ok(network)
    }

    /// Write the network to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> NetworkResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), zoom = self.zoom, tiles = self.tile_count(), "network saved");
        Ok(())
    }

    /// Read a network from a file written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>, options: &ReadOptions) -> NetworkResult<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let network = Self::read_from(&mut reader, options)?;
        info!(path = %path.display(), zoom = network.zoom, tiles = network.tile_count(), "network loaded");
        Ok(network)
    }
}
