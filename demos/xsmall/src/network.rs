//! Synthetic Mobile, AL road network.
//!
//! Five vertices spread over several zoom-14 tiles, so most roads are stored
//! as a canonical record plus a mirror.

use tn_core::attributes::attrs;
use tn_core::{Coordinate, VertexId};
use tn_network::{NetworkRestriction, NetworkResult, RouterDb};

/// The named vertices of the network.
#[derive(Copy, Clone, Debug)]
pub struct Places {
    pub north_residential: VertexId,
    pub south_residential: VertexId,
    pub downtown: VertexId,
    pub commerce_park: VertexId,
    pub connector: VertexId,
}

impl Places {
    pub fn all(&self) -> [(&'static str, VertexId); 5] {
        [
            ("north", self.north_residential),
            ("south", self.south_residential),
            ("downtown", self.downtown),
            ("commerce", self.commerce_park),
            ("connector", self.connector),
        ]
    }
}

/// Add the network to `db` in one write scope.
pub fn build_network(db: &RouterDb) -> NetworkResult<Places> {
    let primary = attrs(&[("highway", "primary"), ("name", "Government Street")]);
    let residential = attrs(&[("highway", "residential")]);
    let oneway = attrs(&[("highway", "residential"), ("oneway", "yes")]);

    let mut w = db.writer();
    let north_residential = w.add_vertex(Coordinate::new(-88.070, 30.710))?;
    let south_residential = w.add_vertex(Coordinate::new(-88.030, 30.670))?;
    let downtown          = w.add_vertex(Coordinate::new(-88.050, 30.695))?;
    let commerce_park     = w.add_vertex(Coordinate::new(-88.030, 30.700))?;
    let connector         = w.add_vertex(Coordinate::new(-88.060, 30.680))?;

    // A curved arterial; the rest are straight.
    let bend = [Coordinate::new(-88.064, 30.706), Coordinate::new(-88.056, 30.699)];
    let north_downtown = w.add_edge(north_residential, downtown, &bend, &primary)?;
    let north_connector = w.add_edge(north_residential, connector, &[], &residential)?;
    w.add_edge(connector, downtown, &[], &residential)?;
    w.add_edge(south_residential, connector, &[], &residential)?;
    w.add_edge(south_residential, commerce_park, &[], &oneway)?;
    w.add_edge(downtown, commerce_park, &[], &primary)?;

    // Coming up the arterial into the north end, no turn onto the side road.
    let no_turn = NetworkRestriction::new(
        vec![(north_downtown, false), (north_connector, true)],
        true,
        attrs(&[("type", "restriction"), ("restriction", "no_right_turn")]),
    );
    w.add_restrictions(&[no_turn])?;

    Ok(Places { north_residential, south_residential, downtown, commerce_park, connector })
}
