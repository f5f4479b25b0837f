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

use std::{sync::Arc, time::Duration};
use anyhow::Result;
use serde_json::{json, Value};
use tokio::time::timeout;
use odin_fleet::prelude::*;
use odin_fleet::document::UpdateDescription;
use odin_fleet::fields;

const NO_EVENT_WAIT: Duration = Duration::from_millis(100);
const EVENT_WAIT: Duration = Duration::from_secs(2);

fn doc (v: Value)->Document {
    v.as_object().unwrap().clone()
}

async fn vehicle_store ()->Result<Arc<MemStore>> {
    let store = Arc::new( MemStore::new());
    store.insert_one( "planes", doc( json!({ "_id": "CARGO10", "currentLocation": [0.0, 0.0], "heading": 0.0 }))).await?;
    store.insert_one( "planes", doc( json!({ "_id": "CARGO11", "currentLocation": [1.0, 0.0] }))).await?;
    Ok(store)
}

// run with "cargo test --test test_feed -- --nocapture"

#[test]
fn test_landing_filter() {
    let filter = landing_filter();
    println!("filter: {}", filter);

    let mut heading_only = UpdateDescription::default();
    heading_only.updated_fields.insert( fields::HEADING.to_string(), json!(180.0));
    let e = ChangeEvent {
        operation_type: OperationType::Update,
        document_key: "CARGO10".to_string(),
        update_description: Some(heading_only),
        full_document: None
    };
    assert!( !filter.matches( &e));

    let mut landed = UpdateDescription::default();
    landed.updated_fields.insert( fields::LANDED.to_string(), json!("Paris_FR"));
    let e = ChangeEvent { update_description: Some(landed), ..e };
    assert!( filter.matches( &e));

    let e = ChangeEvent { operation_type: OperationType::Replace, ..e };
    assert!( !filter.matches( &e));
}

#[tokio::test]
async fn test_only_landings()->Result<()> {
    let store = vehicle_store().await?;
    let mut feed = LandingFeed::subscribe( &*store, "planes").await?;

    //--- scenario D: heading updates never show up
    store.update_one( "planes", "CARGO10", &DocumentUpdate::new().set( fields::HEADING, 45.0)).await?;
    assert!( timeout( NO_EVENT_WAIT, feed.next()).await.is_err());

    // neither do inserts
    store.insert_one( "planes", doc( json!({ "_id": "CARGO12", "currentLocation": [0.0, 0.0], "landed": "Paris_FR" }))).await?;
    assert!( timeout( NO_EVENT_WAIT, feed.next()).await.is_err());

    store.update_one( "planes", "CARGO10", &DocumentUpdate::new().set( fields::LANDED, "Paris_FR").set( fields::HEADING, 90.0)).await?;
    let snapshot = timeout( EVENT_WAIT, feed.next_landing()).await??;
    println!("{:?}", snapshot);

    assert_eq!( snapshot.callsign, "CARGO10");
    assert_eq!( snapshot.landed, "Paris_FR");
    assert_eq!( snapshot.document.get( fields::HEADING), Some( &json!(90.0))); // post-update document
    assert_eq!( snapshot.record()?.vehicle().landed.as_deref(), Some("Paris_FR"));

    Ok(())
}

#[tokio::test]
async fn test_takeoff_is_skipped()->Result<()> {
    let store = vehicle_store().await?;
    let mut feed = LandingFeed::subscribe( &*store, "planes").await?;

    store.update_one( "planes", "CARGO11", &DocumentUpdate::new().set( fields::LANDED, Value::Null)).await?;
    store.update_one( "planes", "CARGO10", &DocumentUpdate::new().set( fields::LANDED, "London_GB")).await?;
    store.update_one( "planes", "CARGO11", &DocumentUpdate::new().set( fields::LANDED, "Berlin_DE")).await?;

    let s1 = timeout( EVENT_WAIT, feed.next_landing()).await??;
    let s2 = timeout( EVENT_WAIT, feed.next_landing()).await??;
    println!("{} landed at {}, {} landed at {}", s1.callsign, s1.landed, s2.callsign, s2.landed);

    assert_eq!( (s1.callsign.as_str(), s1.landed.as_str()), ("CARGO10", "London_GB"));
    assert_eq!( (s2.callsign.as_str(), s2.landed.as_str()), ("CARGO11", "Berlin_DE"));
    Ok(())
}

#[tokio::test]
async fn test_feed_failure_ends_feed()->Result<()> {
    let store = vehicle_store().await?;
    let mut feed = LandingFeed::subscribe( &*store, "planes").await?;
    assert_eq!( store.num_watchers(), 1);

    assert_eq!( store.interrupt_watchers( "connection reset"), 1);

    match timeout( EVENT_WAIT, feed.next()).await? {
        Some(Err(OdinFleetError::FeedError(msg))) => println!("got expected feed error: {msg}"),
        other => panic!("expected feed error, got {:?}", other)
    }

    // not restartable
    store.update_one( "planes", "CARGO10", &DocumentUpdate::new().set( fields::LANDED, "Paris_FR")).await?;
    assert!( feed.next().await.is_none());
    assert!( matches!( feed.next_landing().await, Err(OdinFleetError::FeedClosed)));
    Ok(())
}
