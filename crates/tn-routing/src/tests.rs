//! Unit tests for tn-routing.
//!
//! Fixtures place vertices at fractions of known zoom-14 tiles, the same way
//! the tn-network tests do.  At this latitude 0.2 of a tile is about 300 m.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use tn_core::attributes::attrs;
    use tn_core::{Coordinate, EdgeId, Tile, VertexId};
    use tn_network::{NetworkConfig, RouterDb, RoutingNetwork};
    use tn_profile::{EdgeFactor, FixedProfile, Profile, TableProfile};

    pub const ZOOM: u32 = 14;
    pub const X: u32 = 8409;
    pub const Y: u32 = 5465;

    pub const RESIDENTIAL: &[(&str, &str)] = &[("highway", "residential")];
    pub const ONEWAY: &[(&str, &str)] = &[("highway", "residential"), ("oneway", "yes")];
    pub const UNTAGGED: &[(&str, &str)] = &[];

    /// A point at fraction `(fx, fy)` of tile `(x, y)`.
    pub fn coord(x: u32, y: u32, fx: f64, fy: f64) -> Coordinate {
        let bbox = Tile::new(x, y, ZOOM).unwrap().bounding_box();
        Coordinate::new(
            bbox.min.lon + (bbox.max.lon - bbox.min.lon) * fx,
            bbox.min.lat + (bbox.max.lat - bbox.min.lat) * fy,
        )
    }

    /// Every edge weighs its length in metres; 1 m/s in both directions.
    pub fn fixed() -> Arc<dyn Profile> {
        Arc::new(FixedProfile::new("fixed", EdgeFactor::new(1, 1, 100, 100, true)))
    }

    /// `highway=residential` at 36 km/h (10 m/s, factor 100 per metre).
    pub fn car() -> Arc<dyn Profile> {
        let json = r#"{
            "name": "car",
            "key": "highway",
            "speeds_kmh": { "residential": 36, "primary": 72 }
        }"#;
        Arc::new(TableProfile::from_json(json).unwrap())
    }

    /// A db with the `fixed` and `car` profiles registered.
    pub fn db() -> RouterDb {
        let db = RouterDb::new(&NetworkConfig::default()).unwrap();
        db.add_profile(fixed());
        db.add_profile(car());
        db
    }

    pub fn length_m(network: &RoutingNetwork, edge: EdgeId) -> f64 {
        let mut e = network.edge_enumerator();
        assert!(e.move_to_edge(edge, true));
        e.length_m().unwrap()
    }

    /// Four vertices in a west-to-east row, three edges between them:
    ///
    /// ```text
    ///   a ─e0─ b ─e1─ c ─e2─ d
    /// ```
    pub struct Line {
        pub v: [VertexId; 4],
        pub e: [EdgeId; 3],
    }

    pub fn line(db: &RouterDb, tags: [&[(&str, &str)]; 3]) -> Line {
        let mut w = db.writer();
        let v = [0.1, 0.3, 0.5, 0.7].map(|fx| w.add_vertex(coord(X, Y, fx, 0.5)).unwrap());
        let e = [0, 1, 2].map(|i| w.add_edge(v[i], v[i + 1], &[], &attrs(tags[i])).unwrap());
        Line { v, e }
    }

    /// A centre vertex with one incoming edge and three outgoing ones:
    ///
    /// ```text
    ///            b1
    ///            |
    ///   a ──in── c ── b2
    ///            |
    ///            b3
    /// ```
    pub struct Star {
        pub a: VertexId,
        pub b: [VertexId; 3],
        pub inbound: EdgeId,
        pub out: [EdgeId; 3],
    }

    pub fn star(db: &RouterDb) -> Star {
        let tags = attrs(RESIDENTIAL);
        let mut w = db.writer();
        let a = w.add_vertex(coord(X, Y, 0.2, 0.5)).unwrap();
        let c = w.add_vertex(coord(X, Y, 0.5, 0.5)).unwrap();
        let b = [(0.5, 0.8), (0.8, 0.5), (0.5, 0.2)].map(|(fx, fy)| w.add_vertex(coord(X, Y, fx, fy)).unwrap());
        let inbound = w.add_edge(a, c, &[], &tags).unwrap();
        let out = b.map(|b| w.add_edge(c, b, &[], &tags).unwrap());
        Star { a, b, inbound, out }
    }

    /// `n × n` vertices with edges to the east and north neighbours.
    pub fn grid(db: &RouterDb, n: usize) -> Vec<VertexId> {
        let tags = attrs(RESIDENTIAL);
        let step = 0.8 / n as f64;
        let mut w = db.writer();
        let mut v = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                let c = coord(X, Y, 0.1 + step * col as f64, 0.1 + step * row as f64);
                v.push(w.add_vertex(c).unwrap());
            }
        }
        for row in 0..n {
            for col in 0..n {
                let here = v[row * n + col];
                if col + 1 < n {
                    w.add_edge(here, v[row * n + col + 1], &[], &tags).unwrap();
                }
                if row + 1 < n {
                    w.add_edge(here, v[(row + 1) * n + col], &[], &tags).unwrap();
                }
            }
        }
        v
    }
}

// ── Profile handler ───────────────────────────────────────────────────────────

#[cfg(test)]
mod cost {
    use std::sync::Arc;

    use tn_profile::{EdgeFactor, FixedProfile, Profile};

    use super::helpers::{ONEWAY, RESIDENTIAL, UNTAGGED, car, db, fixed, length_m, line};
    use crate::ProfileHandler;

    #[test]
    fn weight_is_length_times_factor() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let mut handler = ProfileHandler::new(car());

        let mut e = network.edge_enumerator();
        e.move_to_edge(l.e[0], true);
        let w = handler.edge_weight(&e).unwrap().unwrap();
        assert!((w - length_m(&network, l.e[0]) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn oneway_forbids_backward_travel() {
        let db = db();
        let l = line(&db, [RESIDENTIAL, ONEWAY, RESIDENTIAL]);
        let network = db.latest();
        let mut handler = ProfileHandler::new(car());

        let mut e = network.edge_enumerator();
        e.move_to_edge(l.e[1], true);
        assert!(handler.edge_weight(&e).unwrap().is_some());
        e.move_to_edge(l.e[1], false);
        assert_eq!(handler.edge_weight(&e).unwrap(), None);
        assert_eq!(handler.edge_factor(&e).backward_factor, 100, "factor is seen from the travel direction");
    }

    #[test]
    fn untagged_edges_are_not_traversable_by_car() {
        let db = db();
        let l = line(&db, [UNTAGGED; 3]);
        let network = db.latest();
        let mut handler = ProfileHandler::new(car());
        let mut e = network.edge_enumerator();
        e.move_to_edge(l.e[0], true);
        assert_eq!(handler.edge_weight(&e).unwrap(), None);
        assert!(!handler.can_stop(&e));
    }

    #[test]
    fn cache_follows_the_edge_type_function() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let mut handler = ProfileHandler::new(car());
        {
            let network = db.latest();
            let mut e = network.edge_enumerator();
            e.move_to_edge(l.e[0], true);
            assert!(handler.edge_weight(&e).unwrap().is_some());
        }

        // Dropping every attribute from the edge types makes all edges
        // untagged; a stale cache would still answer with the old factor.
        db.writer().set_edge_type_func(|_| Vec::new());
        let network = db.latest();
        let mut e = network.edge_enumerator();
        e.move_to_edge(l.e[0], true);
        assert_eq!(handler.edge_weight(&e).unwrap(), None);
    }

    #[test]
    fn no_turn_costs_are_free() {
        let db = db();
        let network = db.latest();
        let mut handler = ProfileHandler::new(fixed());
        assert_eq!(handler.turn_cost(&network, std::iter::empty()), Some(0.0));
    }

    #[test]
    fn handler_reports_profile_name() {
        let profile: Arc<dyn Profile> = Arc::new(FixedProfile::new("walk", EdgeFactor::new(2, 2, 140, 140, true)));
        let handler = ProfileHandler::new(profile);
        assert_eq!(handler.name(), "walk");
    }
}

// ── Paths ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use tn_core::EdgeId;
    use tn_network::MAX_OFFSET;

    use super::helpers::{RESIDENTIAL, db, line};
    use crate::{Path, PathSegment, RoutingError};

    fn edge(n: u32) -> EdgeId {
        EdgeId::new(0, n)
    }

    fn path(edges: &[u32], offset1: u16, offset2: u16) -> Path {
        let mut p = Path::new();
        for &e in edges {
            p.push(edge(e), true);
        }
        p.set_offset1(offset1);
        p.set_offset2(offset2);
        p
    }

    #[test]
    fn segments_carry_partial_ends() {
        let p = path(&[1, 2, 3], 100, 200);
        let segments: Vec<PathSegment> = p.segments().collect();
        assert_eq!(segments.len(), 3);
        assert_eq!((segments[0].offset1, segments[0].offset2), (100, MAX_OFFSET));
        assert_eq!((segments[1].offset1, segments[1].offset2), (0, MAX_OFFSET));
        assert_eq!((segments[2].offset1, segments[2].offset2), (0, 200));
    }

    #[test]
    fn single_segment_has_both_offsets() {
        let s: Vec<PathSegment> = path(&[7], 10, 20).segments().collect();
        assert_eq!(s, vec![PathSegment { edge_id: edge(7), forward: true, offset1: 10, offset2: 20 }]);
    }

    #[test]
    fn trim_drops_untravelled_ends() {
        let mut p = path(&[1, 2, 3], MAX_OFFSET, 0);
        p.trim();
        assert_eq!(p.edges(), &[(edge(2), true)]);
        assert_eq!((p.offset1(), p.offset2()), (0, MAX_OFFSET));

        let mut single = path(&[1], MAX_OFFSET, MAX_OFFSET);
        single.trim();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn append_merges_shared_edge() {
        let mut p = path(&[1, 2], 0, 300);
        p.append(&path(&[2, 3], 300, 50)).unwrap();
        assert_eq!(p.edges(), &[(edge(1), true), (edge(2), true), (edge(3), true)]);
        assert_eq!((p.offset1(), p.offset2()), (0, 50));
    }

    #[test]
    fn append_joins_at_edge_ends() {
        let mut p = path(&[1], 0, MAX_OFFSET);
        p.append(&path(&[2], 0, 10)).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.offset2(), 10);
    }

    #[test]
    fn append_rejects_gaps() {
        let mut p = path(&[1, 2], 0, 300);
        let err = p.append(&path(&[2, 3], 400, 50)).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidPath(_)));

        let mut p = path(&[1], 0, 100);
        assert!(p.append(&path(&[2], 0, 10)).is_err());
    }

    #[test]
    fn validity_follows_connectivity() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();

        let mut ok = Path::new();
        ok.push(l.e[0], true);
        ok.push(l.e[1], true);
        assert!(ok.is_valid(&network));

        let mut back = Path::new();
        back.push(l.e[1], false);
        back.push(l.e[0], false);
        assert!(back.is_valid(&network));

        let mut gap = Path::new();
        gap.push(l.e[0], true);
        gap.push(l.e[2], true);
        assert!(!gap.is_valid(&network));

        assert!(!Path::new().is_valid(&network));
        let mut reversed = Path::new();
        reversed.push(l.e[0], true);
        reversed.set_offset1(500);
        reversed.set_offset2(100);
        assert!(!reversed.is_valid(&network));
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use tn_core::attributes::attrs;
    use tn_network::{MAX_OFFSET, NetworkRestriction};

    use super::helpers::{ONEWAY, RESIDENTIAL, X, Y, car, coord, db, fixed, length_m, line, star};
    use crate::dijkstra::{one_to_many, one_to_one};
    use crate::{ProfileHandler, RoutingError, Router, RouterSettings, SnapPoint};

    fn no_prune(_: tn_core::VertexId, _: f64) -> bool {
        false
    }

    #[test]
    fn two_vertices_one_edge() {
        let db = db();
        let (a, b, e) = {
            let mut w = db.writer();
            let a = w.add_vertex(coord(X, Y, 0.2, 0.5)).unwrap();
            let b = w.add_vertex(coord(X, Y, 0.6, 0.5)).unwrap();
            let e = w.add_edge(a, b, &[], &[]).unwrap();
            (a, b, e)
        };
        let network = db.latest();
        let source = SnapPoint::from_vertex(&network, a).unwrap();
        let target = SnapPoint::from_vertex(&network, b).unwrap();
        assert_eq!(source, SnapPoint::new(e, 0));
        assert_eq!(target, SnapPoint::new(e, MAX_OFFSET));

        let found = Router::new(&db).path("fixed", source, target).unwrap();
        assert_eq!(found.path.edges(), &[(e, true)]);
        assert_eq!((found.path.offset1(), found.path.offset2()), (0, MAX_OFFSET));
        assert!((found.weight - length_m(&network, e)).abs() < 1e-9);
    }

    #[test]
    fn one_hop_trims_the_target_edge() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let source = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        // Newest edge first: b is listed on e1, at its start.
        let target = SnapPoint::from_vertex(&network, l.v[1]).unwrap();
        assert_eq!(target, SnapPoint::new(l.e[1], 0));

        let mut handler = ProfileHandler::new(fixed());
        let found = one_to_one(&network, &mut handler, source, target, no_prune).unwrap().unwrap();
        assert_eq!(found.path.edges(), &[(l.e[0], true)]);
        assert_eq!((found.path.offset1(), found.path.offset2()), (0, MAX_OFFSET));
        assert!(found.path.is_valid(&network));
    }

    #[test]
    fn three_hops_forward_and_back() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let a = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        let d = SnapPoint::from_vertex(&network, l.v[3]).unwrap();
        let total: f64 = l.e.iter().map(|&e| length_m(&network, e)).sum();

        let router = Router::new(&db);
        let there = router.path("fixed", a, d).unwrap();
        assert_eq!(there.path.edges(), &[(l.e[0], true), (l.e[1], true), (l.e[2], true)]);
        assert_eq!((there.path.offset1(), there.path.offset2()), (0, MAX_OFFSET));
        assert!((there.weight - total).abs() < 1e-6);

        let back = router.path("fixed", d, a).unwrap();
        assert_eq!(back.path.edges(), &[(l.e[2], false), (l.e[1], false), (l.e[0], false)]);
        assert_eq!((back.path.offset1(), back.path.offset2()), (0, MAX_OFFSET));
        assert!((back.weight - total).abs() < 1e-6);
        assert!(back.path.is_valid(&network));
    }

    #[test]
    fn two_hops_forward_and_back() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let a = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        // c is listed on e2, at its start.
        let c = SnapPoint::from_vertex(&network, l.v[2]).unwrap();
        assert_eq!(c, SnapPoint::new(l.e[2], 0));
        let two = length_m(&network, l.e[0]) + length_m(&network, l.e[1]);

        let router = Router::new(&db);
        let there = router.path("fixed", a, c).unwrap();
        assert_eq!(there.path.edges(), &[(l.e[0], true), (l.e[1], true)]);
        assert_eq!((there.path.offset1(), there.path.offset2()), (0, MAX_OFFSET));
        assert!((there.weight - two).abs() < 1e-6);

        let back = router.path("fixed", c, a).unwrap();
        assert_eq!(back.path.edges(), &[(l.e[1], false), (l.e[0], false)]);
        assert_eq!((back.path.offset1(), back.path.offset2()), (0, MAX_OFFSET));
        assert!((back.weight - two).abs() < 1e-6);
        assert!(back.path.is_valid(&network));
    }

    #[test]
    fn target_behind_source_on_a_oneway_loop() {
        let db = db();
        let tags = attrs(ONEWAY);
        let e = {
            let mut w = db.writer();
            let a = w.add_vertex(coord(X, Y, 0.2, 0.3)).unwrap();
            let b = w.add_vertex(coord(X, Y, 0.6, 0.3)).unwrap();
            let c = w.add_vertex(coord(X, Y, 0.4, 0.7)).unwrap();
            [(a, b), (b, c), (c, a)].map(|(from, to)| w.add_edge(from, to, &[], &tags).unwrap())
        };
        let network = db.latest();
        let source = SnapPoint::new(e[0], 49_000);
        let target = SnapPoint::new(e[0], 16_000);

        let mut handler = ProfileHandler::new(car());
        let found = one_to_one(&network, &mut handler, source, target, no_prune).unwrap().unwrap();
        assert_eq!(found.path.edges(), &[(e[0], true), (e[1], true), (e[2], true), (e[0], true)]);
        assert_eq!((found.path.offset1(), found.path.offset2()), (49_000, 16_000));
        assert!(found.path.is_valid(&network));

        // 10 m/s: 100 ms per metre.
        let len = |i: usize| length_m(&network, e[i]);
        let rest = f64::from(MAX_OFFSET - 49_000) / f64::from(MAX_OFFSET);
        let head = 16_000.0 / f64::from(MAX_OFFSET);
        let expected = 100.0 * (len(0) * rest + len(1) + len(2) + len(0) * head);
        assert!((found.weight - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn along_one_edge_both_ways() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let len = length_m(&network, l.e[1]);
        let lo = SnapPoint::new(l.e[1], MAX_OFFSET / 4);
        let hi = SnapPoint::new(l.e[1], MAX_OFFSET / 4 * 3);
        let mut handler = ProfileHandler::new(fixed());

        let up = one_to_one(&network, &mut handler, lo, hi, no_prune).unwrap().unwrap();
        assert_eq!(up.path.edges(), &[(l.e[1], true)]);
        assert_eq!((up.path.offset1(), up.path.offset2()), (lo.offset, hi.offset));
        assert!((up.weight - len * 0.5).abs() < len * 0.001);

        let down = one_to_one(&network, &mut handler, hi, lo, no_prune).unwrap().unwrap();
        assert_eq!(down.path.edges(), &[(l.e[1], false)]);
        assert_eq!(down.path.offset1(), MAX_OFFSET - hi.offset);
        assert_eq!(down.path.offset2(), MAX_OFFSET - lo.offset);
    }

    #[test]
    fn same_point_is_a_zero_weight_path() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let p = SnapPoint::new(l.e[0], 1000);
        let found = Router::new(&db).path("car", p, p).unwrap();
        assert_eq!(found.weight, 0.0);
        assert_eq!(found.path.len(), 1);
    }

    #[test]
    fn route_crosses_tiles() {
        let db = db();
        let tags = attrs(RESIDENTIAL);
        let (v, e) = {
            let mut w = db.writer();
            let a = w.add_vertex(coord(X, Y, 0.8, 0.5)).unwrap();
            let b = w.add_vertex(coord(X + 1, Y, 0.2, 0.5)).unwrap();
            let c = w.add_vertex(coord(X + 1, Y, 0.6, 0.5)).unwrap();
            let e0 = w.add_edge(a, b, &[], &tags).unwrap();
            let e1 = w.add_edge(b, c, &[], &tags).unwrap();
            ([a, b, c], [e0, e1])
        };
        assert!(e[0].is_cross_tile());

        let network = db.latest();
        let router = Router::new(&db);
        let a = SnapPoint::from_vertex(&network, v[0]).unwrap();
        let c = SnapPoint::from_vertex(&network, v[2]).unwrap();
        let there = router.path("car", a, c).unwrap();
        assert_eq!(there.path.edges(), &[(e[0], true), (e[1], true)]);
        let back = router.path("car", c, a).unwrap();
        assert_eq!(back.path.edges(), &[(e[1], false), (e[0], false)]);
    }

    #[test]
    fn oneway_blocks_one_direction() {
        let db = db();
        let l = line(&db, [RESIDENTIAL, ONEWAY, RESIDENTIAL]);
        let network = db.latest();
        let a = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        let d = SnapPoint::from_vertex(&network, l.v[3]).unwrap();

        let router = Router::new(&db);
        assert!(router.path("car", a, d).is_ok());
        let err = router.path("car", d, a).unwrap_err();
        assert!(matches!(err, RoutingError::NoRoute { from, to } if from == d && to == a));
        // The fixed profile ignores tags.
        assert!(router.path("fixed", d, a).is_ok());
    }

    #[test]
    fn restriction_forbids_or_penalizes_a_turn() {
        let db = db();
        let s = star(&db);
        let r = NetworkRestriction::new(
            vec![(s.inbound, true), (s.out[0], true)],
            true,
            attrs(&[("type", "restriction")]),
        );
        db.writer().add_restrictions(&[r]).unwrap();

        let network = db.latest();
        let router = Router::new(&db);
        let a = SnapPoint::from_vertex(&network, s.a).unwrap();
        let b1 = SnapPoint::from_vertex(&network, s.b[0]).unwrap();
        let b2 = SnapPoint::from_vertex(&network, s.b[1]).unwrap();

        // Binary turn-cost factor: the turn is gone.
        assert!(matches!(router.path("car", a, b1), Err(RoutingError::NoRoute { .. })));
        assert!(router.path("car", a, b2).is_ok());

        // Factor 1: the turn costs one unit extra.
        let found = router.path("fixed", a, b1).unwrap();
        let plain = length_m(&network, s.inbound) + length_m(&network, s.out[0]);
        assert!((found.weight - (plain + 1.0)).abs() < 1e-6);
        assert_eq!(found.path.edges(), &[(s.inbound, true), (s.out[0], true)]);
    }

    #[test]
    fn one_to_many_reports_each_target() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let source = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        let targets: Vec<SnapPoint> =
            l.v[1..].iter().map(|&v| SnapPoint::from_vertex(&network, v).unwrap()).collect();

        let mut handler = ProfileHandler::new(car());
        let found = one_to_many(&network, &mut handler, source, &targets, no_prune).unwrap();
        assert_eq!(found.len(), 3);
        let weights: Vec<f64> = found.iter().map(|f| f.as_ref().unwrap().weight).collect();
        assert!(weights[0] < weights[1] && weights[1] < weights[2]);
    }

    #[test]
    fn settled_callback_prunes_branches() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let a = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        let b = SnapPoint::from_vertex(&network, l.v[1]).unwrap();
        let d = SnapPoint::from_vertex(&network, l.v[3]).unwrap();

        // b is ~300 m from a, c ~600 m: c is settled but never expanded.
        let bounded = Router::new(&db).with_settings(RouterSettings { max_distance_m: Some(400.0), ..Default::default() });
        assert!(bounded.path("car", a, b).is_ok());
        assert!(matches!(bounded.path("car", a, d), Err(RoutingError::NoRoute { .. })));
        assert!(Router::new(&db).path("car", a, d).is_ok());

        let mut settled = Vec::new();
        let mut handler = ProfileHandler::new(car());
        let found = one_to_one(&network, &mut handler, a, d, |v, _| {
            settled.push(v);
            v == l.v[1]
        })
        .unwrap();
        assert!(found.is_none());
        assert!(settled.contains(&l.v[1]));
        assert!(!settled.contains(&l.v[2]));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let p = SnapPoint::new(l.e[0], 0);
        let err = Router::new(&db).path("bike", p, p).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownProfile(name) if name == "bike"));
    }

    #[test]
    fn isolated_vertex_cannot_be_a_snap_point() {
        let db = db();
        let v = db.writer().add_vertex(coord(X, Y, 0.5, 0.5)).unwrap();
        let err = SnapPoint::from_vertex(&db.latest(), v).unwrap_err();
        assert!(matches!(err, RoutingError::IsolatedVertex(x) if x == v));
    }
}

// ── Many-to-many ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod many {
    use tn_core::attributes::attrs;

    use super::helpers::{RESIDENTIAL, X, Y, car, coord, db, line};
    use crate::{RoutingError, Router, SnapPoint, many_to_many};

    #[test]
    fn missing_pairs_do_not_fail_the_batch() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let (x, y) = {
            let mut w = db.writer();
            let x = w.add_vertex(coord(X, Y, 0.2, 0.9)).unwrap();
            let y = w.add_vertex(coord(X, Y, 0.4, 0.9)).unwrap();
            w.add_edge(x, y, &[], &attrs(RESIDENTIAL)).unwrap();
            (x, y)
        };
        let network = db.latest();
        let snap = |v| SnapPoint::from_vertex(&network, v).unwrap();
        let sources = [snap(l.v[0]), snap(x)];
        let targets = [snap(l.v[3]), snap(y)];

        let rows = many_to_many(&network, &car(), &sources, &targets, None);
        assert_eq!(rows.len(), 2);
        let first = rows[0].as_ref().unwrap();
        let second = rows[1].as_ref().unwrap();
        assert!(first[0].is_ok());
        assert!(matches!(first[1], Err(RoutingError::NoRoute { .. })));
        assert!(matches!(second[0], Err(RoutingError::NoRoute { .. })));
        assert!(second[1].is_ok());

        let single = Router::new(&db).path("car", sources[0], targets[0]).unwrap();
        assert_eq!(first[0].as_ref().unwrap(), &single);
    }

    #[test]
    fn router_matrix_uses_registered_profile() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let points: Vec<SnapPoint> = l.v.iter().map(|&v| SnapPoint::from_vertex(&network, v).unwrap()).collect();

        let router = Router::new(&db);
        let rows = router.many_to_many("car", &points, &points).unwrap();
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref().unwrap();
            assert_eq!(row.len(), points.len());
            assert_eq!(row[i].as_ref().unwrap().weight, 0.0);
        }
        assert!(matches!(router.many_to_many("bike", &points, &points), Err(RoutingError::UnknownProfile(_))));
    }
}

// ── Routes ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use std::sync::Arc;

    use tn_network::MAX_OFFSET;
    use tn_profile::{EdgeFactor, FixedProfile};

    use super::helpers::{RESIDENTIAL, X, Y, coord, db, length_m, line};
    use crate::{DefaultRouteBuilder, Path, ProfileHandler, RouteBuilder, RoutingError, Router, SnapPoint};

    #[test]
    fn distance_time_and_shape() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let a = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        let d = SnapPoint::from_vertex(&network, l.v[3]).unwrap();
        let total: f64 = l.e.iter().map(|&e| length_m(&network, e)).sum();

        let router = Router::new(&db);
        let slow = router.route("fixed", a, d).unwrap();
        assert_eq!(slow.profile, "fixed");
        assert!((slow.distance_m - total).abs() < 1e-6);
        assert!((slow.time_s - total).abs() < 1e-6, "fixed profile runs at 1 m/s");

        let car = router.route("car", a, d).unwrap();
        assert!((car.time_s - total / 10.0).abs() < 1e-6);

        let expected: Vec<_> = l.v.iter().map(|&v| network.vertex(v).unwrap()).collect();
        assert_eq!(car.shape, expected);
        assert_eq!(car.edges, vec![(l.e[0], true), (l.e[1], true), (l.e[2], true)]);
    }

    #[test]
    fn partial_edges_count_partially() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let len = length_m(&network, l.e[1]);

        let from = SnapPoint::new(l.e[1], MAX_OFFSET / 2);
        let to = SnapPoint::new(l.e[1], MAX_OFFSET);
        let route = Router::new(&db).route("fixed", from, to).unwrap();
        assert!((route.distance_m - len / 2.0).abs() < len * 0.001);
        assert_eq!(route.shape.len(), 2);
        assert_eq!(route.shape[1], network.vertex(l.v[2]).unwrap());
        assert!(route.shape[0].distance_m(coord(X, Y, 0.4, 0.5)) < 1.0);
    }

    #[test]
    fn zero_speed_is_rejected() {
        let db = db();
        db.add_profile(Arc::new(FixedProfile::new("stalled", EdgeFactor::new(1, 1, 0, 0, true))));
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let a = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        let d = SnapPoint::from_vertex(&network, l.v[3]).unwrap();

        let err = Router::new(&db).route("stalled", a, d).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidSpeed { edge, speed_m_per_s } if edge == l.e[0] && speed_m_per_s == 0.0));
    }

    #[test]
    fn empty_path_is_rejected() {
        let db = db();
        let network = db.latest();
        let mut handler = Router::new(&db).handler("car").unwrap();
        let err = DefaultRouteBuilder.build(&network, &mut handler, &Path::new()).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidPath(_)));
    }

    #[test]
    fn custom_builder_is_used() {
        struct NoShape;
        impl RouteBuilder for NoShape {
            fn build(
                &self,
                network: &tn_network::RoutingNetwork,
                handler: &mut ProfileHandler,
                path: &Path,
            ) -> crate::RoutingResult<crate::Route> {
                let mut route = DefaultRouteBuilder.build(network, handler, path)?;
                route.shape.clear();
                Ok(route)
            }
        }

        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let a = SnapPoint::from_vertex(&network, l.v[0]).unwrap();
        let d = SnapPoint::from_vertex(&network, l.v[3]).unwrap();
        let route = Router::new(&db).with_builder(Arc::new(NoShape)).route("car", a, d).unwrap();
        assert!(route.shape.is_empty());
        assert_eq!(route.edges.len(), 3);
    }
}

// ── Snapping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use tn_core::attributes::attrs;
    use tn_network::MAX_OFFSET;

    use super::helpers::{RESIDENTIAL, UNTAGGED, X, Y, car, coord, db, line};
    use crate::{ProfileHandler, RoutingError, Router, SnapPoint, Snapper};

    #[test]
    fn snaps_to_the_middle_of_an_edge() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();

        let p = Snapper::new(&network).snap(coord(X, Y, 0.4, 0.505)).unwrap();
        assert_eq!(p.edge_id, l.e[1]);
        assert!((p.offset as f64 / MAX_OFFSET as f64 - 0.5).abs() < 0.01);
        assert!(p.location(&network).unwrap().distance_m(coord(X, Y, 0.4, 0.5)) < 5.0);
    }

    #[test]
    fn snapping_on_a_vertex_gives_an_edge_end() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let a = network.vertex(l.v[0]).unwrap();
        assert_eq!(Snapper::new(&network).snap(a).unwrap(), SnapPoint::new(l.e[0], 0));
    }

    #[test]
    fn nothing_within_range() {
        let db = db();
        line(&db, [RESIDENTIAL; 3]);
        let network = db.latest();
        let far = coord(X, Y, 0.4, 0.9);
        let err = Snapper::new(&network).snap(far).unwrap_err();
        assert!(matches!(err, RoutingError::SnapFailed { max_distance_m, .. } if max_distance_m == 50.0));
    }

    #[test]
    fn profile_filter_skips_unusable_edges() {
        let db = db();
        let l = line(&db, [RESIDENTIAL; 3]);
        let footway = {
            let mut w = db.writer();
            let p = w.add_vertex(coord(X, Y, 0.3, 0.53)).unwrap();
            let q = w.add_vertex(coord(X, Y, 0.5, 0.53)).unwrap();
            w.add_edge(p, q, &[], &attrs(&[("highway", "footway")])).unwrap()
        };
        let network = db.latest();
        let snapper = Snapper::new(&network).with_max_distance_m(200.0);
        let here = coord(X, Y, 0.4, 0.535);

        assert_eq!(snapper.snap(here).unwrap().edge_id, footway);
        let mut handler = ProfileHandler::new(car());
        assert_eq!(snapper.snap_for(here, &mut handler).unwrap().edge_id, l.e[1]);

        let router = Router::new(&db);
        assert_eq!(router.snap_for("car", coord(X, Y, 0.4, 0.505)).unwrap().edge_id, l.e[1]);
    }

    #[test]
    fn vertex_snap_picks_an_edge_the_profile_can_use() {
        let db = db();
        let (a, b, f, road, track) = {
            let mut w = db.writer();
            let a = w.add_vertex(coord(X, Y, 0.2, 0.5)).unwrap();
            let b = w.add_vertex(coord(X, Y, 0.6, 0.5)).unwrap();
            let f = w.add_vertex(coord(X, Y, 0.2, 0.8)).unwrap();
            let road = w.add_edge(a, b, &[], &attrs(RESIDENTIAL)).unwrap();
            let track = w.add_edge(a, f, &[], &attrs(UNTAGGED)).unwrap();
            (a, b, f, road, track)
        };
        let network = db.latest();

        // Newest edge first: the untagged one.
        assert_eq!(SnapPoint::from_vertex(&network, a).unwrap(), SnapPoint::new(track, 0));
        let mut handler = ProfileHandler::new(car());
        assert_eq!(SnapPoint::from_vertex_for(&network, a, &mut handler).unwrap(), SnapPoint::new(road, 0));

        let router = Router::new(&db);
        let source = router.snap_vertex("car", a).unwrap();
        let target = router.snap_vertex("car", b).unwrap();
        assert_eq!(target, SnapPoint::new(road, MAX_OFFSET));
        let found = router.path("car", source, target).unwrap();
        assert_eq!(found.path.edges(), &[(road, true)]);

        let err = router.snap_vertex("car", f).unwrap_err();
        assert!(matches!(err, RoutingError::NoStoppableEdge { vertex, profile } if vertex == f && profile == "car"));
        assert_eq!(router.snap_vertex("fixed", f).unwrap(), SnapPoint::new(track, MAX_OFFSET));
    }

    #[test]
    fn display_names_edge_and_offset() {
        let p = SnapPoint::new(tn_core::EdgeId::new(3, 4), 99);
        assert_eq!(p.to_string(), "EdgeId(3-4)@99");
    }
}

// ── Concurrent readers ────────────────────────────────────────────────────────

#[cfg(test)]
mod parallel {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rayon::prelude::*;

    use super::helpers::{X, Y, coord, db, grid};
    use crate::{Router, SnapPoint};

    #[test]
    fn parallel_routing_matches_sequential() {
        let db = db();
        let v = grid(&db, 5);
        let network = db.latest();
        let router = Router::new(&db);

        let mut rng = SmallRng::seed_from_u64(7);
        let pairs: Vec<(SnapPoint, SnapPoint)> = (0..40)
            .map(|_| {
                let s = v[rng.gen_range(0..v.len())];
                let t = v[rng.gen_range(0..v.len())];
                (SnapPoint::from_vertex(&network, s).unwrap(), SnapPoint::from_vertex(&network, t).unwrap())
            })
            .collect();

        let sequential: Vec<f64> =
            pairs.iter().map(|&(s, t)| router.path("car", s, t).unwrap().weight).collect();
        let parallel: Vec<f64> = pairs
            .par_iter()
            .map_init(
                || router.handler("car").unwrap(),
                |handler, &(s, t)| router.path_with(handler, s, t).unwrap().weight,
            )
            .collect();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn parallel_snapping_matches_sequential() {
        let db = db();
        grid(&db, 5);
        let router = Router::new(&db);

        let mut rng = SmallRng::seed_from_u64(11);
        let points: Vec<_> = (0..40)
            .map(|_| coord(X, Y, rng.gen_range(0.1..0.9), rng.gen_range(0.1..0.9)))
            .collect();

        let sequential: Vec<Option<SnapPoint>> = points.iter().map(|&p| router.snap(p).ok()).collect();
        let parallel: Vec<Option<SnapPoint>> = points.par_iter().map(|&p| router.snap(p).ok()).collect();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn routers_keep_their_snapshot() {
        let db = db();
        let v = grid(&db, 3);
        let router = Router::new(&db);
        db.writer().add_vertex(coord(X, Y, 0.95, 0.95)).unwrap();
        assert_eq!(router.network().vertex_count(), v.len());
        assert_eq!(db.latest().vertex_count(), v.len() + 1);
    }
}
