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

use std::sync::Mutex;
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::debug;

use crate::document::{
    document_id, ChangeEvent, ChangeFilter, Document, DocumentUpdate, FullDocument, OperationType, Projection
};
use crate::errors::{feed_error, store_error, Result};

/// the event sequence of a change feed subscription. It ends with an `Err(..)` item (or just ends)
/// if the underlying cursor fails, and cannot be restarted
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent>>;

/// the capabilities we need from the document store. Instances are shared between components as
/// `Arc<dyn StoreClient>`, connection management is the responsibility of the implementation
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// point lookup by document id
    async fn find_one (&self, collection: &str, id: &str, projection: &Projection)->Result<Option<Document>>;

    /// open a change feed subscription with a server side match predicate
    async fn watch (&self, collection: &str, filter: &ChangeFilter, full_document: FullDocument)->Result<ChangeStream>;

    /// atomic multi-field update of a single document. Returns false if there was no such document
    async fn update_one (&self, collection: &str, id: &str, update: &DocumentUpdate)->Result<bool>;

    async fn insert_one (&self, collection: &str, doc: Document)->Result<()>;
}

/* #region MemStore *********************************************************************************************/

struct Watcher {
    collection: String,
    filter: ChangeFilter,
    full_document: FullDocument,
    tx: UnboundedSender<Result<ChangeEvent>>,
}

/// an in-memory [`StoreClient`] that keeps JSON documents per collection and supports change feeds.
/// Match predicates are evaluated on the "server" side, i.e. subscribers only see matching events.
/// Each update is applied while holding the document entry lock, which makes multi-field updates atomic
pub struct MemStore {
    collections: DashMap<String,DashMap<String,Document>>,
    watchers: Mutex<Vec<Watcher>>,
}

impl MemStore {
    pub fn new ()->Self {
        MemStore { collections: DashMap::new(), watchers: Mutex::new(Vec::new()) }
    }

    pub fn len (&self, collection: &str)->usize {
        self.collections.get(collection).map( |c| c.len()).unwrap_or(0)
    }

    /// number of open change feed subscriptions
    pub fn num_watchers (&self)->usize {
        match self.watchers.lock() {
            Ok(mut watchers) => {
                watchers.retain( |w| !w.tx.is_closed());
                watchers.len()
            }
            Err(_) => 0
        }
    }

    /// terminate all open change feed cursors with an error, which is what subscribers see if the
    /// server restarts or the connection drops
    pub fn interrupt_watchers (&self, reason: &str)->usize {
        match self.watchers.lock() {
            Ok(mut watchers) => {
                let n = watchers.len();
                for w in watchers.drain(..) {
                    let _ = w.tx.send( Err( feed_error( reason)));
                }
                n
            }
            Err(_) => 0
        }
    }

    fn notify (&self, collection: &str, event: ChangeEvent, post_image: Option<&Document>)->Result<()> {
        let mut watchers = self.watchers.lock().map_err( |_| store_error("watcher list poisoned"))?;

        watchers.retain( |w| {
            if w.tx.is_closed() { return false }

            if w.collection == collection && w.filter.matches( &event) {
                let mut e = event.clone();
                if e.operation_type == OperationType::Update {
                    e.full_document = match w.full_document {
                        FullDocument::UpdateLookup => post_image.cloned(),
                        FullDocument::Default => None
                    };
                }
                w.tx.send( Ok(e)).is_ok()
            } else {
                true
            }
        });

        Ok(())
    }
}

impl Default for MemStore {
    fn default()->Self { MemStore::new() }
}

#[async_trait]
impl StoreClient for MemStore {
    async fn find_one (&self, collection: &str, id: &str, projection: &Projection)->Result<Option<Document>> {
        Ok( self.collections.get( collection)
            .and_then( |c| c.get( id).map( |doc| projection.apply( doc.value())))
        )
    }

    async fn watch (&self, collection: &str, filter: &ChangeFilter, full_document: FullDocument)->Result<ChangeStream> {
        let (tx, rx) = mpsc::unbounded_channel::<Result<ChangeEvent>>();
        {
            let mut watchers = self.watchers.lock().map_err( |_| store_error("watcher list poisoned"))?;
            watchers.push( Watcher { collection: collection.to_string(), filter: filter.clone(), full_document, tx });
        }
        debug!("opened change feed on '{}' with filter: {}", collection, filter);

        // an Err item terminates the stream (cursors do not survive errors)
        let stream = stream::unfold( (rx,false), |(mut rx, failed)| async move {
            if failed { return None }
            rx.recv().await.map( |item| {
                let failed = item.is_err();
                (item, (rx, failed))
            })
        });

        Ok( stream.boxed() )
    }

    async fn update_one (&self, collection: &str, id: &str, update: &DocumentUpdate)->Result<bool> {
        let Some(coll) = self.collections.get( collection) else { return Ok(false) };
        let Some(mut doc) = coll.get_mut( id) else { return Ok(false) };

        let desc = update.apply_to( doc.value_mut()).map_err( store_error)?;
        let event = ChangeEvent {
            operation_type: OperationType::Update,
            document_key: id.to_string(),
            update_description: Some(desc),
            full_document: None
        };

        // notify while we still hold the document lock so that feed order is write order
        self.notify( collection, event, Some(doc.value()))?;
        Ok(true)
    }

    async fn insert_one (&self, collection: &str, doc: Document)->Result<()> {
        let id = document_id( &doc).ok_or_else( || store_error("document has no string _id"))?.to_string();
        let coll = self.collections.entry( collection.to_string()).or_insert_with( DashMap::new);

        match coll.entry( id.clone()) {
            Entry::Occupied(_) => Err( store_error( format!("duplicate key {id} in collection {collection}"))),
            Entry::Vacant(e) => {
                let entry = e.insert( doc.clone());
                let event = ChangeEvent {
                    operation_type: OperationType::Insert,
                    document_key: id,
                    update_description: None,
                    full_document: Some(doc)
                };
                let res = self.notify( collection, event, None);
                drop(entry);
                res
            }
        }
    }
}

/* #endregion MemStore */
