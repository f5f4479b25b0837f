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

use futures::StreamExt;
use serde_json::Value;
use tracing::debug;

use crate::document::{ChangeEvent, ChangeFilter, Document, FullDocument, OperationType};
use crate::errors::{OdinFleetError, Result};
use crate::fields;
use crate::store::{ChangeStream, StoreClient};
use crate::vehicle::VehicleRecord;

/// the server side predicate for landings: updates that (re)set the `landed` field
pub fn landing_filter ()->ChangeFilter {
    ChangeFilter::new()
        .operation( OperationType::Update)
        .updated_field_exists( fields::LANDED)
}

/// the post-update vehicle document of a landing
#[derive(Debug,Clone,PartialEq)]
pub struct LandingSnapshot {
    pub callsign: String,

    /// the waypoint id the vehicle landed at
    pub landed: String,

    pub document: Document,
}

impl LandingSnapshot {
    /// None if this is not a landing, i.e. there is no post-update document or `landed` is not set
    pub fn from_change_event (event: ChangeEvent)->Option<LandingSnapshot> {
        let document = event.full_document?;
        let landed = match document.get( fields::LANDED) {
            Some(Value::String(s)) => s.clone(),
            _ => return None
        };
        Some( LandingSnapshot { callsign: event.document_key, landed, document })
    }

    pub fn record (&self)->Result<VehicleRecord> {
        VehicleRecord::from_document( &self.document)
    }
}

/// a single change feed subscription for vehicle landings. This is not restartable - once
/// [`LandingFeed::next`] returns an error or None the feed is done and a new one has to be subscribed
pub struct LandingFeed {
    collection: String,
    stream: ChangeStream,
    done: bool,
}

impl LandingFeed {
    pub async fn subscribe (store: &dyn StoreClient, collection: &str)->Result<LandingFeed> {
        let stream = store.watch( collection, &landing_filter(), FullDocument::UpdateLookup).await?;
        Ok( LandingFeed { collection: collection.to_string(), stream, done: false })
    }

    pub fn collection (&self)->&str { self.collection.as_str() }

    /// wait for the next landing. Qualifying change events that are not landings (take-offs that
    /// clear the `landed` field, or vehicles that were deleted before the post image was looked up)
    /// are skipped
    pub async fn next (&mut self)->Option<Result<LandingSnapshot>> {
        if self.done { return None }

        while let Some(item) = self.stream.next().await {
            match item {
                Ok(event) => {
                    let key = event.document_key.clone();
                    match LandingSnapshot::from_change_event( event) {
                        Some(snapshot) => return Some(Ok(snapshot)),
                        None => debug!("ignoring non-landing update of {} in '{}'", key, self.collection)
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e))
                }
            }
        }

        self.done = true;
        None
    }

    /// like [`LandingFeed::next`] but turns the end of the feed into a [`OdinFleetError::FeedClosed`] error
    pub async fn next_landing (&mut self)->Result<LandingSnapshot> {
        self.next().await.unwrap_or( Err(OdinFleetError::FeedClosed))
    }
}
