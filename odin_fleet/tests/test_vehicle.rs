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

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use odin_fleet::prelude::*;

fn doc (v: Value)->Document {
    v.as_object().unwrap().clone()
}

fn expect_not_populated (v: Value) {
    match VehicleRecord::from_document( &doc(v)) {
        Err(OdinFleetError::NotPopulated(msg)) => println!("not populated: {msg}"),
        other => panic!("expected NotPopulated, got {:?}", other)
    }
}

// run with "cargo test --test test_vehicle -- --nocapture"

#[test]
fn test_legacy_record() {
    let d = doc( json!({
        "_id": "CARGO10",
        "currentLocation": [-122.4194, 37.7749],
        "heading": 90.0,
        "route": ["Paris_FR", "London_GB"],
        "landed": "SanFrancisco_US",
        "status": "loading"
    }));

    let rec = VehicleRecord::from_document( &d).unwrap();
    println!("{:?}", rec);

    assert_eq!( rec.schema_version(), SchemaVersion::V0);
    assert!( matches!( rec, VehicleRecord::LegacyV0(_)));

    let v = rec.vehicle();
    assert_eq!( v.callsign, "CARGO10");
    assert_eq!( rec.callsign(), "CARGO10");
    assert_eq!( v.current_location, Some( GeoPos::from_lon_lat_degrees(-122.4194, 37.7749)));
    assert_eq!( v.heading, Some(90.0));
    assert_eq!( v.route, vec!["Paris_FR".to_string(), "London_GB".to_string()]);
    assert_eq!( v.landed.as_deref(), Some("SanFrancisco_US"));

    assert_eq!( rec.aggregate(), FlightAggregate::default());
}

#[test]
fn test_minimal_legacy_record() {
    let rec = VehicleRecord::from_document( &doc( json!({ "_id": "CARGO0", "currentLocation": [0.0, 0.0] }))).unwrap();
    println!("{:?}", rec);

    let v = rec.vehicle();
    assert_eq!( v.heading, None);
    assert!( v.route.is_empty());
    assert_eq!( v.landed, None);
    assert_eq!( v.status, None);
}

#[test]
fn test_legacy_string_heading() {
    let rec = VehicleRecord::from_document( &doc( json!({
        "_id": "CARGO1", "currentLocation": [0.0, 0.0], "heading": "270", "schemaVersion": 0
    }))).unwrap();
    assert_eq!( rec.vehicle().heading, Some(270.0));
}

#[test]
fn test_aggregated_record() {
    let d = doc( json!({
        "_id": "CARGO10",
        "schemaVersion": 1,
        "currentLocation": [1.0, 0.0],
        "landed": "Y",
        "lastLandingEvent": { "location": "Y", "date": "2025-01-01T01:00:00Z", "position": [1.0, 0.0] },
        "totalDistanceFlown": 69.17,
        "totalFlightTime": 3600.7,
        "requiresMaintenance": false
    }));

    let rec = VehicleRecord::from_document( &d).unwrap();
    println!("{:?}", rec);
    assert_eq!( rec.schema_version(), SchemaVersion::V1);

    let agg = rec.aggregate();
    assert_eq!( agg.total_distance_flown, 69.17);
    assert_eq!( agg.total_flight_time, 3600); // legacy float seconds are truncated
    assert!( !agg.requires_maintenance);

    let last = agg.last_landing_event.unwrap();
    assert_eq!( last.location, "Y");
    assert_eq!( last.date, Utc.with_ymd_and_hms( 2025, 1, 1, 1, 0, 0).unwrap());
    assert_eq!( last.position, Some( GeoPos::from_lon_lat_degrees(1.0, 0.0)));
}

#[test]
fn test_aggregated_record_defaults() {
    let rec = VehicleRecord::from_document( &doc( json!({
        "_id": "CARGO2", "schemaVersion": 1, "currentLocation": [0.0, 0.0],
        "lastLandingEvent": { "location": "Atlantis", "date": "2025-01-01T00:00:00Z", "position": null }
    }))).unwrap();

    let agg = rec.aggregate();
    println!("{}", agg);
    assert_eq!( agg.total_distance_flown, 0.0);
    assert_eq!( agg.total_flight_time, 0);
    assert!( !agg.requires_maintenance);
    assert_eq!( agg.last_landing_event.unwrap().position, None);
}

#[test]
fn test_not_populated() {
    expect_not_populated( json!({ "currentLocation": [0.0, 0.0] }));
    expect_not_populated( json!({ "_id": 42, "currentLocation": [0.0, 0.0] }));
    expect_not_populated( json!({ "_id": "CARGO3", "currentLocation": [0.0, 0.0], "landed": 1 }));
    expect_not_populated( json!({ "_id": "CARGO3", "currentLocation": [0.0, 0.0], "status": ["ok"] }));
}

#[test]
fn test_lenient_base_fields() {
    // whatever clients wrote into position, heading and route does not invalidate the record
    let rec = VehicleRecord::from_document( &doc( json!({
        "_id": "CARGO3", "currentLocation": [200.0, 3.0], "heading": "abc", "route": ["Paris_FR", 7], "landed": "London_GB"
    }))).unwrap();
    println!("{}", rec.vehicle());

    let v = rec.vehicle();
    assert_eq!( v.current_location, Some( GeoPos::from_lon_lat_degrees(200.0, 3.0)));
    assert_eq!( v.heading, None);
    assert_eq!( v.route, vec!["Paris_FR".to_string()]);
    assert_eq!( v.landed.as_deref(), Some("London_GB"));

    for loc in [json!(null), json!([0.0]), json!("2,3"), json!(["2","3"])] {
        let rec = VehicleRecord::from_document( &doc( json!({ "_id": "CARGO3", "currentLocation": loc }))).unwrap();
        assert_eq!( rec.vehicle().current_location, None);
    }

    let rec = VehicleRecord::from_document( &doc( json!({ "_id": "CARGO3" }))).unwrap();
    assert_eq!( rec.vehicle().current_location, None);
    assert_eq!( rec.aggregate(), FlightAggregate::default());
}

#[test]
fn test_aggregate_not_populated() {
    expect_not_populated( json!({ "_id": "CARGO4", "schemaVersion": 1, "currentLocation": [0.0, 0.0], "totalDistanceFlown": "far" }));
    expect_not_populated( json!({ "_id": "CARGO4", "schemaVersion": 1, "currentLocation": [0.0, 0.0], "totalFlightTime": -1 }));
    expect_not_populated( json!({ "_id": "CARGO4", "schemaVersion": 1, "currentLocation": [0.0, 0.0], "requiresMaintenance": "yes" }));
    expect_not_populated( json!({ "_id": "CARGO4", "schemaVersion": 1, "currentLocation": [0.0, 0.0], "lastLandingEvent": { "location": "X" } }));
}

#[test]
fn test_unknown_schema_version() {
    expect_not_populated( json!({ "_id": "CARGO5", "schemaVersion": 2, "currentLocation": [0.0, 0.0] }));
    expect_not_populated( json!({ "_id": "CARGO5", "schemaVersion": "1", "currentLocation": [0.0, 0.0] }));
}
