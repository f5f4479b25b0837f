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

use std::sync::Arc;
use async_trait::async_trait;
use serde::{Serialize,Deserialize};
use serde_json::Value;

use crate::document::{Document, Projection};
use crate::errors::{not_populated, Result};
use crate::fields;
use crate::geo::GeoPos;
use crate::store::StoreClient;

/// a named location vehicles can land at, e.g. `{"_id": "Paris_FR", "country": "France", "position": [2.3522,48.8566]}`
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Waypoint {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    pub position: GeoPos,
}

impl Waypoint {
    pub fn new (id: impl ToString, country: Option<&str>, position: GeoPos)->Self {
        Waypoint { id: id.to_string(), country: country.map( |c| c.to_string()), position }
    }

    pub fn from_document (doc: &Document)->Result<Self> {
        serde_json::from_value( Value::Object( doc.clone()))
            .map_err( |e| not_populated!("waypoint {:?}: {}", doc.get( fields::ID), e))
    }

    pub fn to_document (&self)->Result<Document> {
        match serde_json::to_value( self)? {
            Value::Object(doc) => Ok(doc),
            _ => Err( crate::op_failed!("waypoint {} does not serialize into a document", self.id))
        }
    }
}

/// resolves waypoint ids to coordinates
#[async_trait]
pub trait WaypointDirectory: Send + Sync {
    /// Ok(None) if there is no such waypoint
    async fn lookup (&self, id: &str)->Result<Option<GeoPos>>;
}

/// a [`WaypointDirectory`] that looks up waypoint documents in a store collection
pub struct StoreWaypointDirectory {
    store: Arc<dyn StoreClient>,
    collection: String,
    projection: Projection,
}

impl StoreWaypointDirectory {
    pub fn new (store: Arc<dyn StoreClient>, collection: impl ToString)->Self {
        let projection = Projection::fields( &[fields::COUNTRY, fields::POSITION]);
        StoreWaypointDirectory { store, collection: collection.to_string(), projection }
    }

    pub async fn get_waypoint (&self, id: &str)->Result<Option<Waypoint>> {
        match self.store.find_one( &self.collection, id, &self.projection).await? {
            Some(doc) => Ok( Some( Waypoint::from_document( &doc)?)),
            None => Ok(None)
        }
    }
}

#[async_trait]
impl WaypointDirectory for StoreWaypointDirectory {
    async fn lookup (&self, id: &str)->Result<Option<GeoPos>> {
        Ok( self.get_waypoint( id).await?.map( |wp| wp.position))
    }
}
