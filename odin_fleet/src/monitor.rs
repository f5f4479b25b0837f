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

//! the landing monitor is the long running background task that connects the landing feed with the
//! aggregation engine. It re-subscribes with a fixed delay whenever the feed fails or ends. There is no
//! resume token, landings that happen while we are backing off are lost. Processing is at-most-once:
//! if persisting the aggregate of a landing fails the landing is dropped and we continue with the next one

use std::{fmt, sync::{Arc, atomic::{AtomicU8, AtomicU64, Ordering}}};
use tokio::{select, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::aggregate::{AggregateStep, AggregationEngine};
use crate::config::FleetConfig;
use crate::errors::Result;
use crate::feed::{LandingFeed, LandingSnapshot};
use crate::landing::LandingEventTransformer;
use crate::store::StoreClient;
use crate::vehicle::is_not_populated;
use crate::waypoint::{StoreWaypointDirectory, WaypointDirectory};

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
#[repr(u8)]
pub enum MonitorState {
    Running = 0,
    BackingOff = 1,
    /// only entered through cancellation
    Stopped = 2,
}

impl From<u8> for MonitorState {
    fn from (v: u8)->Self {
        match v {
            0 => MonitorState::Running,
            1 => MonitorState::BackingOff,
            _ => MonitorState::Stopped,
        }
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonitorState::Running => "running",
            MonitorState::BackingOff => "backing-off",
            MonitorState::Stopped => "stopped",
        };
        write!(f, "{s}")
    }
}

/// counters and state of a running monitor, shared between the monitor task and its owner
#[derive(Debug)]
pub struct MonitorStats {
    landings: AtomicU64,
    persisted: AtomicU64,
    dropped: AtomicU64,
    restarts: AtomicU64,
    state: AtomicU8,
}

impl MonitorStats {
    pub fn new ()->Self {
        MonitorStats {
            landings: AtomicU64::new(0),
            persisted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            restarts: AtomicU64::new(0),
            state: AtomicU8::new( MonitorState::Running as u8),
        }
    }

    /// landings received from the feed
    pub fn landings (&self)->u64 { self.landings.load( Ordering::Relaxed) }

    /// landings with successfully persisted aggregates
    pub fn persisted (&self)->u64 { self.persisted.load( Ordering::Relaxed) }

    /// landings that could not be persisted
    pub fn dropped (&self)->u64 { self.dropped.load( Ordering::Relaxed) }

    /// number of times the feed failed or ended
    pub fn restarts (&self)->u64 { self.restarts.load( Ordering::Relaxed) }

    pub fn state (&self)->MonitorState { MonitorState::from( self.state.load( Ordering::Acquire)) }

    fn set_state (&self, state: MonitorState) {
        self.state.store( state as u8, Ordering::Release)
    }

    fn inc (counter: &AtomicU64) {
        counter.fetch_add( 1, Ordering::Relaxed);
    }
}

impl Default for MonitorStats {
    fn default()->Self { MonitorStats::new() }
}

impl fmt::Display for MonitorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "MonitorStats( state: {}, landings: {}, persisted: {}, dropped: {}, restarts: {})",
                self.state(), self.landings(), self.persisted(), self.dropped(), self.restarts())
    }
}

enum FeedOutcome {
    Cancelled,
    Failed,
}

pub struct LandingMonitor {
    store: Arc<dyn StoreClient>,
    transformer: LandingEventTransformer,
    engine: AggregationEngine,
    config: FleetConfig,
    stats: Arc<MonitorStats>,
}

impl LandingMonitor {
    /// a monitor that resolves landing waypoints from the configured waypoint collection
    pub fn new (store: Arc<dyn StoreClient>, config: FleetConfig)->Self {
        let directory = Arc::new( StoreWaypointDirectory::new( store.clone(), &config.waypoint_collection));
        Self::with_directory( store, directory, config)
    }

    pub fn with_directory (store: Arc<dyn StoreClient>, directory: Arc<dyn WaypointDirectory>, config: FleetConfig)->Self {
        let transformer = LandingEventTransformer::new( directory);
        let engine = AggregationEngine::from_config( store.clone(), &config);
        let stats = Arc::new( MonitorStats::new());
        LandingMonitor { store, transformer, engine, config, stats }
    }

    pub fn stats (&self)->Arc<MonitorStats> { self.stats.clone() }

    /// run until cancelled. Cancellation is checked between landings and while backing off, i.e. a
    /// landing that is already being processed is always completed
    pub async fn run (self, cancel: CancellationToken) {
        let collection = self.config.vehicle_collection.as_str();

        loop {
            self.stats.set_state( MonitorState::Running);

            match LandingFeed::subscribe( self.store.as_ref(), collection).await {
                Ok(mut feed) => {
                    info!("monitoring landings in '{}'", collection);
                    if let FeedOutcome::Cancelled = self.process_feed( &mut feed, &cancel).await {
                        break
                    }
                }
                Err(e) => {
                    error!("failed to subscribe to landings in '{}': {}", collection, e);
                }
            }

            self.stats.set_state( MonitorState::BackingOff);
            MonitorStats::inc( &self.stats.restarts);
            info!("re-subscribing to '{}' in {:?}", collection, self.config.reconnect_delay);

            select! {
                _ = cancel.cancelled() => break,
                _ = sleep( self.config.reconnect_delay) => {}
            }
        }

        self.stats.set_state( MonitorState::Stopped);
        info!("landing monitor for '{}' terminated", collection);
    }

    async fn process_feed (&self, feed: &mut LandingFeed, cancel: &CancellationToken)->FeedOutcome {
        loop {
            select! { // the feed is cancellation safe, landing processing happens outside of the select futures
                _ = cancel.cancelled() => return FeedOutcome::Cancelled,

                maybe_landing = feed.next() => {
                    match maybe_landing {
                        Some(Ok(snapshot)) => {
                            MonitorStats::inc( &self.stats.landings);
                            match self.process_landing( &snapshot).await {
                                Ok(_) => MonitorStats::inc( &self.stats.persisted),
                                Err(e) => {
                                    MonitorStats::inc( &self.stats.dropped);
                                    if is_not_populated( &e) {
                                        warn!("dropping landing of malformed vehicle {}: {}", snapshot.callsign, e);
                                    } else {
                                        error!("dropping landing of {} at {}: {}", snapshot.callsign, snapshot.landed, e);
                                    }
                                }
                            }
                        }
                        Some(Err(e)) => {
                            warn!("landing feed of '{}' failed: {}", feed.collection(), e);
                            return FeedOutcome::Failed
                        }
                        None => {
                            warn!("landing feed of '{}' closed", feed.collection());
                            return FeedOutcome::Failed
                        }
                    }
                }
            }
        }
    }

    /// turn the snapshot into a landing event and persist the new aggregate
    pub async fn process_landing (&self, snapshot: &LandingSnapshot)->Result<AggregateStep> {
        let event = self.transformer.transform( snapshot).await;
        debug!("processing {} of vehicle {}", event, snapshot.callsign);
        self.engine.apply( &snapshot.callsign, &event).await
    }
}

/// owner side of a spawned [`LandingMonitor`]
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    stats: Arc<MonitorStats>,
}

impl MonitorHandle {
    pub fn stats (&self)->&MonitorStats { self.stats.as_ref() }

    pub fn is_finished (&self)->bool { self.task.is_finished() }

    /// cancel the monitor and wait for its task to terminate
    pub async fn shutdown (self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("landing monitor task failed: {}", e);
        }
    }
}

pub fn spawn_monitor (monitor: LandingMonitor)->MonitorHandle {
    let cancel = CancellationToken::new();
    let stats = monitor.stats();
    let task = tokio::spawn( monitor.run( cancel.clone()));
    MonitorHandle { cancel, task, stats }
}

/// create and spawn a [`LandingMonitor`] for the given store
pub fn spawn_landing_monitor (store: Arc<dyn StoreClient>, config: FleetConfig)->MonitorHandle {
    spawn_monitor( LandingMonitor::new( store, config))
}
