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

//! flight log aggregates.
//!
//! Totals are always recomputed from the previous totals and the last flight log entry, they are
//! never incremented in place by the store. This makes the step function [`next_aggregate`] pure,
//! and replaying a complete flight log with [`replay_flight_log`] reproduces the persisted totals.
//! The maintenance flag is sticky: once set it is never written back to false.

use std::{fmt, sync::Arc};
use serde_json::Value;
use tracing::{debug, warn};
use uom::si::length::mile;

use crate::config::FleetConfig;
use crate::document::{DocumentUpdate, Projection};
use crate::errors::{OdinFleetError, Result};
use crate::fields;
use crate::geo::great_circle_distance;
use crate::landing::LandingEvent;
use crate::store::StoreClient;
use crate::vehicle::{SchemaVersion, VehicleRecord};

/// the derived state of a (version 1) vehicle record
#[derive(Debug,Clone,Default,PartialEq)]
pub struct FlightAggregate {
    pub last_landing_event: Option<LandingEvent>,

    /// statute miles
    pub total_distance_flown: f64,

    /// seconds
    pub total_flight_time: u64,

    pub requires_maintenance: bool,
}

impl fmt::Display for FlightAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "FlightAggregate( distance: {:.2} mi, time: {} s, maintenance: {}",
                self.total_distance_flown, self.total_flight_time, self.requires_maintenance)?;
        if let Some(e) = &self.last_landing_event { write!( f, ", last: {}", e)?; }
        write!( f, ")")
    }
}

/// the result of adding one landing to a [`FlightAggregate`]
#[derive(Debug,Clone,PartialEq)]
pub struct AggregateStep {
    /// statute miles between the last and the new landing position (0 if either is unknown)
    pub distance_increment: f64,

    /// whole seconds between the last and the new landing (0 if there was no last landing)
    pub time_increment: u64,

    /// the new totals, with the new landing as `last_landing_event`
    pub aggregate: FlightAggregate,

    /// did this landing set the maintenance flag
    pub newly_requires_maintenance: bool,
}

/// the pure aggregation step
pub fn next_aggregate (prior: &FlightAggregate, event: &LandingEvent, maintenance_limit: f64)->AggregateStep {
    let (distance_increment, time_increment) = match &prior.last_landing_event {
        Some(last) => {
            let dist = match (&last.position, &event.position) {
                (Some(p0), Some(p1)) => great_circle_distance( p0, p1).get::<mile>(),
                _ => 0.0
            };
            let secs = (event.date - last.date).num_seconds().unsigned_abs(); // num_seconds() truncates
            (dist, secs)
        }
        None => (0.0, 0)
    };

    let total_distance_flown = prior.total_distance_flown + distance_increment;
    let total_flight_time = prior.total_flight_time + time_increment;
    let requires_maintenance = prior.requires_maintenance || total_distance_flown > maintenance_limit;

    AggregateStep {
        distance_increment,
        time_increment,
        aggregate: FlightAggregate {
            last_landing_event: Some(event.clone()),
            total_distance_flown,
            total_flight_time,
            requires_maintenance,
        },
        newly_requires_maintenance: requires_maintenance && !prior.requires_maintenance,
    }
}

/// recompute the aggregate from a complete, chronologically ordered flight log
pub fn replay_flight_log<'a,I> (events: I, maintenance_limit: f64)->FlightAggregate
    where I: IntoIterator<Item=&'a LandingEvent>
{
    events.into_iter().fold( FlightAggregate::default(), |agg, e| next_aggregate( &agg, e, maintenance_limit).aggregate)
}

/// the update we send to the store for a new landing. This is one atomic update of the vehicle record
pub fn aggregate_update (step: &AggregateStep, event: &LandingEvent)->Result<DocumentUpdate> {
    let agg = &step.aggregate;
    let mut update = DocumentUpdate::new()
        .set( fields::SCHEMA_VERSION, SchemaVersion::CURRENT.as_u32())
        .set( fields::TOTAL_FLIGHT_TIME, agg.total_flight_time)
        .set( fields::TOTAL_DISTANCE_FLOWN, agg.total_distance_flown)
        .push( fields::FLIGHT_LOG, event.to_value()?);

    if step.newly_requires_maintenance {
        update = update.set( fields::REQUIRES_MAINTENANCE, true);
    }

    Ok(update)
}

/// reads the current aggregate of a vehicle, computes the next one and writes it back
pub struct AggregationEngine {
    store: Arc<dyn StoreClient>,
    collection: String,
    maintenance_limit: f64,
    projection: Projection,
}

impl AggregationEngine {
    pub fn new (store: Arc<dyn StoreClient>, collection: impl ToString, maintenance_limit: f64)->Self {
        // everything but the flight log, of which we only need the last entry
        let projection = Projection::fields( &[
            fields::SCHEMA_VERSION, fields::CURRENT_LOCATION, fields::HEADING, fields::ROUTE, fields::LANDED, fields::STATUS,
            fields::TOTAL_DISTANCE_FLOWN, fields::TOTAL_FLIGHT_TIME, fields::REQUIRES_MAINTENANCE
        ]).with_last_element( fields::FLIGHT_LOG, fields::LAST_LANDING_EVENT);

        AggregationEngine { store, collection: collection.to_string(), maintenance_limit, projection }
    }

    pub fn from_config (store: Arc<dyn StoreClient>, config: &FleetConfig)->Self {
        Self::new( store, &config.vehicle_collection, config.maintenance_limit)
    }

    /// the current record without the full flight log
    pub async fn get_record (&self, callsign: &str)->Result<VehicleRecord> {
        match self.store.find_one( &self.collection, callsign, &self.projection).await? {
            Some(doc) => VehicleRecord::from_document( &doc),
            None => Err( OdinFleetError::NoSuchVehicle( callsign.to_string()))
        }
    }

    /// add a landing to the vehicle's flight log and update its totals. Note this is a blind write, i.e.
    /// concurrent writers of the same vehicle record are not detected
    pub async fn apply (&self, callsign: &str, event: &LandingEvent)->Result<AggregateStep> {
        let record = self.get_record( callsign).await?;
        let step = next_aggregate( &record.aggregate(), event, self.maintenance_limit);
        let update = aggregate_update( &step, event)?;

        if !self.store.update_one( &self.collection, callsign, &update).await? {
            return Err( OdinFleetError::NoSuchVehicle( callsign.to_string()))
        }

        debug!("vehicle {} landed at {}: +{:.2} mi, +{} s", callsign, event.location, step.distance_increment, step.time_increment);
        if step.newly_requires_maintenance {
            warn!("vehicle {} requires maintenance", callsign);
        }

        Ok(step)
    }

    /// the complete flight log. This is the only place where we read it in full
    pub async fn get_flight_log (&self, callsign: &str)->Result<Vec<LandingEvent>> {
        let projection = Projection::fields( &[fields::FLIGHT_LOG]);
        let doc = self.store.find_one( &self.collection, callsign, &projection).await?
            .ok_or_else( || OdinFleetError::NoSuchVehicle( callsign.to_string()))?;

        match doc.get( fields::FLIGHT_LOG) {
            None | Some(Value::Null) => Ok( Vec::new()),
            Some(v) => Ok( serde_json::from_value( v.clone())?)
        }
    }

    /// recompute the aggregate of a vehicle from its persisted flight log (this does not write anything)
    pub async fn recompute_from_log (&self, callsign: &str)->Result<FlightAggregate> {
        let log = self.get_flight_log( callsign).await?;
        Ok( replay_flight_log( &log, self.maintenance_limit))
    }
}
