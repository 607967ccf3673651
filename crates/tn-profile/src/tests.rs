//! Unit tests for tn-profile.

#[cfg(test)]
mod factor {
    use crate::{EdgeFactor, TurnCostFactor};

    #[test]
    fn reverse_swaps_directions() {
        let f = EdgeFactor::new(10, 0, 1_389, 0, true);
        let r = f.reverse();
        assert_eq!(r.forward_factor, 0);
        assert_eq!(r.backward_factor, 10);
        assert_eq!(r.backward_speed, 1_389);
        assert_eq!(r.reverse(), f);
    }

    #[test]
    fn speed_units() {
        let f = EdgeFactor::new(1, 1, 1_389, 250, true);
        assert!((f.speed_m_per_s(true) - 13.89).abs() < 1e-9);
        assert!((f.speed_m_per_s(false) - 2.5).abs() < 1e-9);
        assert!(!EdgeFactor::NO_FACTOR.is_traversable());
    }

    #[test]
    fn turn_cost_factor_semantics() {
        assert_eq!(TurnCostFactor::BINARY.apply(1), None);
        assert_eq!(TurnCostFactor::BINARY.apply(0), Some(0.0));
        assert_eq!(TurnCostFactor::EMPTY.apply(40), Some(0.0));
        assert_eq!(TurnCostFactor(3).apply(5), Some(15.0));
    }
}

#[cfg(test)]
mod cache {
    use crate::cache::CACHE_BLOCK_SIZE;
    use crate::{EdgeFactor, EdgeFactorCache, TurnCostFactor, TurnCostFactorCache};

    #[test]
    fn empty_cache_misses() {
        let cache = EdgeFactorCache::new();
        assert_eq!(cache.get(0), None);
        assert_eq!(cache.get(1_000_000), None);
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn set_grows_in_blocks() {
        let mut cache = EdgeFactorCache::new();
        let f = EdgeFactor::new(1, 1, 1, 1, true);
        cache.set(3, f);
        assert_eq!(cache.capacity(), CACHE_BLOCK_SIZE);
        assert_eq!(cache.get(3), Some(f));
        assert_eq!(cache.get(2), None);

        cache.set(CACHE_BLOCK_SIZE as u32, f);
        assert_eq!(cache.capacity(), 2 * CACHE_BLOCK_SIZE);

        // Never shrinks.
        cache.set(1, f);
        assert_eq!(cache.capacity(), 2 * CACHE_BLOCK_SIZE);
    }

    #[test]
    fn turn_cost_cache() {
        let mut cache = TurnCostFactorCache::new();
        cache.set(7, TurnCostFactor::BINARY);
        assert_eq!(cache.get(7), Some(TurnCostFactor::BINARY));
    }
}

#[cfg(test)]
mod table {
    use tn_core::attributes::attrs;

    use crate::{Profile, ProfileError, TableProfile, TurnCostFactor};

    const CAR: &str = r#"{
        "name": "car",
        "key": "highway",
        "speeds_kmh": { "primary": 90, "residential": 36 },
        "stoppable": ["residential"]
    }"#;

    #[test]
    fn parses_json_with_defaults() {
        let p = TableProfile::from_json(CAR).unwrap();
        assert_eq!(p.name(), "car");
        assert_eq!(p.config().oneway_key, "oneway");
        assert!(p.config().respect_restrictions);
    }

    #[test]
    fn factor_from_speed() {
        let p = TableProfile::from_json(CAR).unwrap();
        let f = p.factor(&attrs(&[("highway", "residential")]));
        assert_eq!(f.forward_factor, 100); // 3600 s/h ÷ 36 km/h
        assert_eq!(f.backward_factor, 100);
        assert_eq!(f.forward_speed, 1_000); // 10 m/s
        assert!(f.can_stop);

        let primary = p.factor(&attrs(&[("highway", "primary")]));
        assert_eq!(primary.forward_factor, 40);
        assert!(!primary.can_stop);
    }

    #[test]
    fn unknown_values_are_closed() {
        let p = TableProfile::from_json(CAR).unwrap();
        assert!(!p.factor(&attrs(&[("highway", "footway")])).is_traversable());
        assert!(!p.factor(&attrs(&[("name", "x")])).is_traversable());
    }

    #[test]
    fn oneway_handling() {
        let p = TableProfile::from_json(CAR).unwrap();
        let fwd = p.factor(&attrs(&[("highway", "primary"), ("oneway", "yes")]));
        assert!(fwd.forward_factor > 0 && fwd.backward_factor == 0);
        let rev = p.factor(&attrs(&[("highway", "primary"), ("oneway", "-1")]));
        assert!(rev.forward_factor == 0 && rev.backward_factor > 0);
    }

    #[test]
    fn factor_is_order_independent() {
        let p = TableProfile::from_json(CAR).unwrap();
        let a = p.factor(&attrs(&[("highway", "primary"), ("oneway", "yes")]));
        let b = p.factor(&attrs(&[("oneway", "yes"), ("highway", "primary")]));
        assert_eq!(a, b);
    }

    #[test]
    fn restrictions_forbid() {
        let p = TableProfile::from_json(CAR).unwrap();
        assert_eq!(
            p.turn_cost_factor(&attrs(&[("type", "restriction")])),
            TurnCostFactor::BINARY
        );
        assert_eq!(p.turn_cost_factor(&[]), TurnCostFactor::EMPTY);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let json = r#"{ "name": "bad", "key": "highway", "speeds_kmh": { "primary": 0 } }"#;
        assert!(matches!(TableProfile::from_json(json), Err(ProfileError::Config(_))));
        assert!(matches!(TableProfile::from_json("{"), Err(ProfileError::Json(_))));
    }
}
