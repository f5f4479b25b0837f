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

//! odin_fleet maintains derived flight statistics for a fleet of cargo vehicles.
//!
//! The vehicle documents live in an external document store that is accessed through the
//! [`store::StoreClient`] trait. A single background task (see [`monitor`]) subscribes to the
//! change feed of the vehicle collection, picks up every update that sets the `landed` field,
//! turns it into a [`landing::LandingEvent`] and lets the [`aggregate::AggregationEngine`] append
//! it to the vehicle flight log while recomputing the cumulative distance, flight time and the
//! (sticky) maintenance flag.
//!
//! ```text
//!   StoreClient::watch ──▶ LandingFeed ──▶ LandingEventTransformer ──▶ AggregationEngine ──▶ StoreClient::update_one
//!        ▲                                       │
//!        └──────── LandingMonitor (restart with fixed back-off) ─────────────────────────┘
//! ```

pub mod errors;
pub use errors::{OdinFleetError, Result, op_failed};

pub mod config;
pub use config::{FleetConfig, load_config};

pub mod geo;
pub mod document;
pub mod store;
pub mod waypoint;
pub mod vehicle;
pub mod landing;
pub mod aggregate;
pub mod feed;
pub mod monitor;

pub mod prelude {
    pub use crate::errors::{OdinFleetError, Result};
    pub use crate::config::{FleetConfig, load_config};
    pub use crate::geo::{GeoPos, great_circle_distance};
    pub use crate::document::{Document, ChangeEvent, ChangeFilter, OperationType, FullDocument, DocumentUpdate, Projection};
    pub use crate::store::{StoreClient, ChangeStream, MemStore};
    pub use crate::waypoint::{WaypointDirectory, StoreWaypointDirectory, Waypoint};
    pub use crate::vehicle::{Vehicle, VehicleRecord, SchemaVersion};
    pub use crate::landing::{LandingEvent, LandingEventTransformer};
    pub use crate::aggregate::{FlightAggregate, AggregateStep, AggregationEngine, next_aggregate, replay_flight_log, aggregate_update};
    pub use crate::feed::{LandingFeed, LandingSnapshot, landing_filter};
    pub use crate::monitor::{LandingMonitor, MonitorHandle, MonitorState, MonitorStats, spawn_monitor, spawn_landing_monitor};
}

/// document field names shared by all modules (these are the names used by the store)
pub mod fields {
    pub const ID: &str = "_id";
    pub const SCHEMA_VERSION: &str = "schemaVersion";

    //--- vehicles
    pub const CURRENT_LOCATION: &str = "currentLocation";
    pub const HEADING: &str = "heading";
    pub const ROUTE: &str = "route";
    pub const LANDED: &str = "landed";
    pub const STATUS: &str = "status";

    //--- vehicle aggregates (schema version 1)
    pub const LAST_LANDING_EVENT: &str = "lastLandingEvent";
    pub const TOTAL_DISTANCE_FLOWN: &str = "totalDistanceFlown";
    pub const TOTAL_FLIGHT_TIME: &str = "totalFlightTime";
    pub const REQUIRES_MAINTENANCE: &str = "requiresMaintenance";
    pub const FLIGHT_LOG: &str = "flightLog";

    //--- landing events
    pub const LANDING_LOCATION: &str = "location";
    pub const LANDING_DATE: &str = "date";
    pub const POSITION: &str = "position";

    //--- waypoints
    pub const COUNTRY: &str = "country";
}
