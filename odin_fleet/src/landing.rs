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

use std::{fmt, sync::Arc};
use chrono::{DateTime, Utc};
use serde::{Serialize,Deserialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::Result;
use crate::feed::LandingSnapshot;
use crate::geo::GeoPos;
use crate::waypoint::WaypointDirectory;

/// a flight log entry. `position` is None if the waypoint could not be resolved when the vehicle landed
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct LandingEvent {
    pub location: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub position: Option<GeoPos>,
}

impl LandingEvent {
    pub fn new (location: impl ToString, date: DateTime<Utc>, position: Option<GeoPos>)->Self {
        LandingEvent { location: location.to_string(), date, position }
    }

    pub fn to_value (&self)->Result<Value> {
        Ok( serde_json::to_value( self)?)
    }
}

impl fmt::Display for LandingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "LandingEvent( location: {}, date: {}", self.location, self.date)?;
        if let Some(p) = &self.position { write!( f, ", position: {}", p)?; }
        write!( f, ")")
    }
}

/// turns landing snapshots into [`LandingEvent`]s by resolving the landing waypoint coordinates
pub struct LandingEventTransformer {
    directory: Arc<dyn WaypointDirectory>,
}

impl LandingEventTransformer {
    pub fn new (directory: Arc<dyn WaypointDirectory>)->Self {
        LandingEventTransformer { directory }
    }

    /// the landing date is the time we process the snapshot
    pub async fn transform (&self, snapshot: &LandingSnapshot)->LandingEvent {
        self.transform_at( snapshot, Utc::now()).await
    }

    /// this never fails - an unresolvable waypoint only results in an event without position, which
    /// the aggregation treats like a vehicle without previous position
    pub async fn transform_at (&self, snapshot: &LandingSnapshot, date: DateTime<Utc>)->LandingEvent {
        let position = match self.directory.lookup( &snapshot.landed).await {
            Ok(Some(pos)) => Some(pos),
            Ok(None) => {
                warn!("vehicle {} landed at unknown waypoint {}", snapshot.callsign, snapshot.landed);
                None
            }
            Err(e) => {
                warn!("failed to resolve waypoint {} for vehicle {}: {}", snapshot.landed, snapshot.callsign, e);
                None
            }
        };

        LandingEvent::new( &snapshot.landed, date, position)
    }
}
