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

//! vehicle documents come in two shapes: version 0 records were created by backend scripts and only
//! have the base fields, version 1 records additionally carry the flight log aggregates. Both are
//! valid. Parsing is total per variant - we either get a fully populated [`VehicleRecord`] or a
//! [`OdinFleetError::NotPopulated`] error that says what was wrong

use std::fmt;
use serde_json::Value;

use crate::aggregate::FlightAggregate;
use crate::document::{document_id, Document};
use crate::errors::{not_populated, OdinFleetError, Result};
use crate::fields;
use crate::geo::GeoPos;
use crate::landing::LandingEvent;

#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord)]
pub enum SchemaVersion {
    V0,
    V1,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V1;

    pub fn as_u32 (&self)->u32 {
        match self {
            SchemaVersion::V0 => 0,
            SchemaVersion::V1 => 1,
        }
    }

    /// a missing (or null) `schemaVersion` field means version 0
    pub fn of_document (doc: &Document)->Result<SchemaVersion> {
        match doc.get( fields::SCHEMA_VERSION) {
            None | Some(Value::Null) => Ok(SchemaVersion::V0),
            Some(v) => match v.as_f64() {
                Some(n) if n == 0.0 => Ok(SchemaVersion::V0),
                Some(n) if n == 1.0 => Ok(SchemaVersion::V1),
                _ => Err( not_populated!("vehicle {:?} has unsupported schema version {}", document_id(doc), v))
            }
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}", self.as_u32())
    }
}

/// the base fields every vehicle record has
#[derive(Debug,Clone,PartialEq)]
pub struct Vehicle {
    pub callsign: String,
    pub current_location: Option<GeoPos>,
    pub heading: Option<f64>,
    pub route: Vec<String>,
    pub landed: Option<String>,
    pub status: Option<String>,
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Vehicle( callsign: {}", self.callsign)?;
        if let Some(pos) = &self.current_location { write!( f, ", pos: {}", pos)?; }
        if let Some(hdg) = self.heading { write!( f, ", hdg: {:.0}", hdg)?; }
        if !self.route.is_empty() { write!( f, ", route: {:?}", self.route)?; }
        if let Some(landed) = &self.landed { write!( f, ", landed: {}", landed)?; }
        if let Some(status) = &self.status { write!( f, ", status: {}", status)?; }
        write!( f, ")")
    }
}

/// tagged vehicle record variants, one per schema version
#[derive(Debug,Clone,PartialEq)]
pub enum VehicleRecord {
    LegacyV0(Vehicle),
    AggregatedV1(Vehicle, FlightAggregate),
}

impl VehicleRecord {
    pub fn from_document (doc: &Document)->Result<VehicleRecord> {
        match SchemaVersion::of_document( doc)? {
            SchemaVersion::V0 => parse_v0( doc),
            SchemaVersion::V1 => parse_v1( doc),
        }
    }

    pub fn schema_version (&self)->SchemaVersion {
        match self {
            VehicleRecord::LegacyV0(_) => SchemaVersion::V0,
            VehicleRecord::AggregatedV1(..) => SchemaVersion::V1,
        }
    }

    pub fn vehicle (&self)->&Vehicle {
        match self {
            VehicleRecord::LegacyV0(v) => v,
            VehicleRecord::AggregatedV1(v,_) => v,
        }
    }

    pub fn callsign (&self)->&str { self.vehicle().callsign.as_str() }

    /// version 0 records have zero/absent aggregates
    pub fn aggregate (&self)->FlightAggregate {
        match self {
            VehicleRecord::LegacyV0(_) => FlightAggregate::default(),
            VehicleRecord::AggregatedV1(_,agg) => agg.clone(),
        }
    }
}

fn parse_v0 (doc: &Document)->Result<VehicleRecord> {
    Ok( VehicleRecord::LegacyV0( parse_base_fields( doc)?))
}

fn parse_v1 (doc: &Document)->Result<VehicleRecord> {
    let vehicle = parse_base_fields( doc)?;
    let cs = vehicle.callsign.as_str();

    let last_landing_event = match doc.get( fields::LAST_LANDING_EVENT) {
        None | Some(Value::Null) => None,
        Some(v) => Some( serde_json::from_value::<LandingEvent>( v.clone())
            .map_err( |e| not_populated!("vehicle {} has invalid {}: {}", cs, fields::LAST_LANDING_EVENT, e))?)
    };

    let total_distance_flown = opt_f64( doc, fields::TOTAL_DISTANCE_FLOWN, cs)?.unwrap_or(0.0);
    if total_distance_flown < 0.0 {
        return Err( not_populated!("vehicle {} has negative {}", cs, fields::TOTAL_DISTANCE_FLOWN))
    }

    // older writers stored flight time as a floating point number of seconds
    let total_flight_time = opt_f64( doc, fields::TOTAL_FLIGHT_TIME, cs)?.unwrap_or(0.0);
    if total_flight_time < 0.0 {
        return Err( not_populated!("vehicle {} has negative {}", cs, fields::TOTAL_FLIGHT_TIME))
    }

    let requires_maintenance = match doc.get( fields::REQUIRES_MAINTENANCE) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(v) => return Err( not_populated!("vehicle {} has non-boolean {}: {}", cs, fields::REQUIRES_MAINTENANCE, v))
    };

    let aggregate = FlightAggregate {
        last_landing_event,
        total_distance_flown,
        total_flight_time: total_flight_time.trunc() as u64,
        requires_maintenance,
    };

    Ok( VehicleRecord::AggregatedV1( vehicle, aggregate))
}

/// only `_id` is required. Malformed position, heading or route values are read as None/empty
fn parse_base_fields (doc: &Document)->Result<Vehicle> {
    let callsign = document_id( doc)
        .ok_or_else( || not_populated!("vehicle record without string {}", fields::ID))?
        .to_string();
    let cs = callsign.as_str();

    let current_location = doc.get( fields::CURRENT_LOCATION).and_then( lon_lat);

    // legacy update paths stored the heading as a string
    let heading = match doc.get( fields::HEADING) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None
    };

    let route = match doc.get( fields::ROUTE) {
        Some(Value::Array(a)) => a.iter().filter_map( |wp| wp.as_str().map( |id| id.to_string())).collect(),
        _ => Vec::new()
    };

    let landed = opt_string( doc, fields::LANDED, cs)?;
    let status = opt_string( doc, fields::STATUS, cs)?;

    Ok( Vehicle { callsign, current_location, heading, route, landed, status })
}

/// any two element numeric array, without range check
fn lon_lat (v: &Value)->Option<GeoPos> {
    match v.as_array().map( |a| a.as_slice()) {
        Some([lon,lat]) => Some( GeoPos::from_lon_lat_degrees( lon.as_f64()?, lat.as_f64()?)),
        _ => None
    }
}

fn opt_string (doc: &Document, field: &str, cs: &str)->Result<Option<String>> {
    match doc.get( field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok( Some(s.clone())),
        Some(v) => Err( not_populated!("vehicle {} has non-string {}: {}", cs, field, v))
    }
}

fn opt_f64 (doc: &Document, field: &str, cs: &str)->Result<Option<f64>> {
    match doc.get( field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok( n.as_f64()),
        Some(v) => Err( not_populated!("vehicle {} has non-numeric {}: {}", cs, field, v))
    }
}

/// is this a "not populated" parse result (as opposed to a store or transport error)
pub fn is_not_populated (e: &OdinFleetError)->bool {
    matches!( e, OdinFleetError::NotPopulated(_))
}
