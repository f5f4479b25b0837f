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

use std::{fs, path::Path, time::Duration};
use serde::{Deserialize, Deserializer};
use crate::errors::Result;

/// distance (in statute miles) after which a vehicle is flagged as requiring maintenance
pub const MAINTENANCE_DISTANCE_LIMIT: f64 = 50_000.0;

/// delay before the landing monitor re-opens a failed change feed subscription
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct FleetConfig {
    /// name of the store collection that holds vehicle documents
    pub vehicle_collection: String,

    /// name of the store collection that holds waypoint documents (with `position` coordinates)
    pub waypoint_collection: String,

    /// fixed back-off between change feed re-subscriptions, e.g. "5s"
    #[serde(deserialize_with = "deserialize_duration")]
    pub reconnect_delay: Duration,

    /// statute miles
    pub maintenance_limit: f64,
}

impl Default for FleetConfig {
    fn default()->Self {
        FleetConfig {
            vehicle_collection: "planes".to_string(),
            waypoint_collection: "cities".to_string(),
            reconnect_delay: RECONNECT_DELAY,
            maintenance_limit: MAINTENANCE_DISTANCE_LIMIT,
        }
    }
}

/// load a [`FleetConfig`] from a RON file. Fields that are not specified get their default values
pub fn load_config<P: AsRef<Path>> (path: P)->Result<FleetConfig> {
    let data = fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

pub fn deserialize_duration <'a,D>(deserializer: D) -> std::result::Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse_duration::parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}
