/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */


#![allow(unused)]

//! simulates a fleet of cargo vehicles that land at random cities while the landing monitor
//! keeps their flight statistics up to date. Run with
//! `RUST_LOG=odin_fleet=debug cargo run --example simulate_fleet -- --vehicles 5 --landings 20`

use std::{sync::Arc, time::Duration};
use anyhow::{anyhow, Result};
use clap::Parser;
use rand::{Rng, seq::IndexedRandom};
use serde_json::json;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;
use odin_fleet::prelude::*;
use odin_fleet::fields;

#[derive(Parser, Debug)]
#[command(version, about, long_about = "simulate fleet landings and print the resulting flight statistics")]
pub struct Args {
    /// number of simulated vehicles
    #[arg(short,long, default_value_t = 5)]
    pub vehicles: usize,

    /// number of landings to simulate (until Ctrl-C if 0)
    #[arg(short,long, default_value_t = 20)]
    pub landings: usize,

    /// milliseconds between landings
    #[arg(short,long, default_value_t = 500)]
    pub interval: u64,

    /// optional RON config file
    #[arg(short,long)]
    pub config: Option<String>,
}

const CITIES: &[(&str, &str, f64, f64)] = &[
    ("Amsterdam_NL", "Netherlands", 4.9041, 52.3676),
    ("Berlin_DE", "Germany", 13.4050, 52.5200),
    ("Cairo_EG", "Egypt", 31.2357, 30.0444),
    ("Dubai_AE", "United Arab Emirates", 55.2708, 25.2048),
    ("London_GB", "United Kingdom", -0.1276, 51.5072),
    ("Madrid_ES", "Spain", -3.7038, 40.4168),
    ("NewYork_US", "United States", -74.0060, 40.7128),
    ("Paris_FR", "France", 2.3522, 48.8566),
    ("SaoPaulo_BR", "Brazil", -46.6333, -23.5505),
    ("Singapore_SG", "Singapore", 103.8198, 1.3521),
    ("Sydney_AU", "Australia", 151.2093, -33.8688),
    ("Tokyo_JP", "Japan", 139.6503, 35.6762),
];

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config( path)?,
        None => FleetConfig::default()
    };

    let store = Arc::new( MemStore::new());
    let callsigns = seed( store.as_ref(), &config, args.vehicles).await?;

    let monitor = spawn_landing_monitor( store.clone(), config.clone());
    while store.num_watchers() == 0 {
        sleep( Duration::from_millis(10)).await;
    }

    let mut n = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("interrupted");
                break
            }
            _ = sleep( Duration::from_millis( args.interval)) => {
                let (callsign, city) = land_random_vehicle( store.as_ref(), &config, &callsigns).await?;
                println!("{callsign} landed at {city}");
                n += 1;
                if args.landings > 0 && n >= args.landings { break }
            }
        }
    }

    sleep( Duration::from_millis(200)).await; // let the monitor catch up
    println!("{}", monitor.stats());
    monitor.shutdown().await;

    let engine = AggregationEngine::from_config( store.clone(), &config);
    println!("\n{:<10} {:>12} {:>10} {:>6}  {}", "vehicle", "miles", "seconds", "maint", "last landing");
    for cs in &callsigns {
        let agg = engine.get_record( cs).await?.aggregate();
        let last = agg.last_landing_event.as_ref().map( |e| e.location.as_str()).unwrap_or("-");
        println!("{:<10} {:>12.1} {:>10} {:>6}  {}", cs, agg.total_distance_flown, agg.total_flight_time, agg.requires_maintenance, last);
    }

    Ok(())
}

async fn seed (store: &MemStore, config: &FleetConfig, n_vehicles: usize)->Result<Vec<String>> {
    for (id, country, lon, lat) in CITIES {
        let wp = Waypoint::new( id, Some(*country), GeoPos::from_lon_lat_degrees( *lon, *lat));
        store.insert_one( &config.waypoint_collection, wp.to_document()?).await?;
    }

    let mut rng = rand::rng();
    let mut callsigns = Vec::with_capacity( n_vehicles);

    for i in 0..n_vehicles {
        let callsign = format!("CARGO{i}");
        let (home, _, lon, lat) = CITIES.choose( &mut rng).ok_or_else( || anyhow!("no cities"))?;
        let vehicle = json!({
            "_id": callsign,
            "currentLocation": [lon, lat],
            "heading": 0.0,
            "route": [],
            "landed": home,
        });
        if let serde_json::Value::Object(doc) = vehicle {
            store.insert_one( &config.vehicle_collection, doc).await?;
        }
        callsigns.push( callsign);
    }

    Ok(callsigns)
}

async fn land_random_vehicle (store: &MemStore, config: &FleetConfig, callsigns: &[String])->Result<(String,String)> {
    let mut rng = rand::rng();
    let callsign = callsigns.choose( &mut rng).ok_or_else( || anyhow!("no vehicles"))?.clone();
    let (city, _, lon, lat) = CITIES.choose( &mut rng).ok_or_else( || anyhow!("no cities"))?;
    let heading: f64 = rng.random_range( 0.0..360.0);

    let update = DocumentUpdate::new()
        .set( fields::CURRENT_LOCATION, json!([lon, lat]))
        .set( fields::HEADING, heading)
        .set( fields::LANDED, *city);
    store.update_one( &config.vehicle_collection, &callsign, &update).await?;

    Ok( (callsign, city.to_string()))
}
