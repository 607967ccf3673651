//! xsmall: smallest example for the tilenet routing engine.
//!
//! Builds a 5-vertex road network inspired by the geography of Mobile,
//! Alabama, routes across it with a JSON-configured car profile and a fixed
//! walking profile, and round-trips the network through a file.
//!
//! Set `RUST_LOG=debug` to see writer commits and search statistics.

mod network;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tn_core::Coordinate;
use tn_network::{NetworkConfig, ReadOptions, RouterDb};
use tn_profile::{EdgeFactor, FixedProfile, TableProfile};
use tn_routing::{Router, RouterSettings};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const CAR_PROFILE: &str = r#"{
    "name": "car",
    "key": "highway",
    "speeds_kmh": { "primary": 70, "residential": 40 },
    "respect_restrictions": true
}"#;

/// 1.4 m/s on every edge, no restrictions.
const WALK_FACTOR: EdgeFactor = EdgeFactor::new(714, 714, 140, 140, true);

const OUTPUT_DIR: &str = "output/xsmall";

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== xsmall: tilenet routing ===");

    // 1. Router db and profiles.
    let db = RouterDb::new(&NetworkConfig::default())?;
    db.add_profile(Arc::new(TableProfile::from_json(CAR_PROFILE)?));
    db.add_profile(Arc::new(FixedProfile::new("walk", WALK_FACTOR)));
    println!("Profiles: {}", db.profile_names().join(", "));

    // 2. Road network.
    let places = build_network(&db)?;
    let network = db.latest();
    println!(
        "Road network: {} vertices in {} tiles (zoom {})",
        network.vertex_count(),
        network.tile_count(),
        network.zoom()
    );
    println!();

    let router = Router::new(&db).with_settings(RouterSettings {
        max_distance_m: Some(20_000.0),
        snap_distance_m: 500.0,
    });

    // 3. One route per profile, from a point near the north end to commerce park.
    let start = router.snap_for("car", Coordinate::new(-88.0690, 30.7085))?;
    let end = router.snap_vertex("car", places.commerce_park)?;
    println!("Start snapped to {start}, end at {end}");

    let t0 = Instant::now();
    println!("{:<8} {:>10} {:>10} {:>6}", "Profile", "Distance", "Time", "Edges");
    println!("{}", "-".repeat(38));
    for profile in ["car", "walk"] {
        let route = router.route(profile, start, end)?;
        println!(
            "{:<8} {:>8.0} m {:>6.1} min {:>6}",
            route.profile,
            route.distance_m,
            route.time_s / 60.0,
            route.edges.len()
        );
    }
    info!(elapsed_us = t0.elapsed().as_micros() as u64, "routes computed");
    println!();

    // 4. Travel-time matrix between all named places.
    let named = places.all();
    let points = named
        .iter()
        .map(|&(_, v)| router.snap_vertex("car", v))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = router.many_to_many("car", &points, &points)?;

    print!("{:<10}", "car (min)");
    for (name, _) in &named {
        print!(" {name:>9}");
    }
    println!();
    for ((name, _), row) in named.iter().zip(&rows) {
        print!("{name:<10}");
        match row {
            Ok(cells) => {
                for cell in cells {
                    match cell {
                        // Car weights are milliseconds.
                        Ok(found) => print!(" {:>9.1}", found.weight / 60_000.0),
                        Err(_) => print!(" {:>9}", "-"),
                    }
                }
            }
            Err(e) => print!(" search failed: {e}"),
        }
        println!();
    }
    println!();

    // 5. Persist and reload.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let path = Path::new(OUTPUT_DIR).join("network.tn");
    db.save(&path)?;
    let reloaded = RouterDb::load(&path, &ReadOptions::default())?;
    println!(
        "Reloaded {} vertices from {}",
        reloaded.latest().vertex_count(),
        path.display()
    );

    Ok(())
}
