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

//! the store-agnostic vocabulary we use to talk to a document store: documents, change events,
//! change feed match predicates, projections and multi-field updates

use std::fmt;
use serde::{Serialize,Deserialize};
use serde_json::{Map, Value};
use crate::fields;

/// a JSON object as stored in the document store. The document id is stored in the `_id` field
pub type Document = Map<String,Value>;

pub fn document_id (doc: &Document)->Option<&str> {
    doc.get( fields::ID).and_then( Value::as_str)
}

/* #region change events ****************************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Insert,
    Update,
    Replace,
    Delete,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationType::Insert => "insert",
            OperationType::Update => "update",
            OperationType::Replace => "replace",
            OperationType::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// the diff part of an update event
#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDescription {
    pub updated_fields: Document,
    pub removed_fields: Vec<String>,
}

/// what the change feed delivers for each matching store operation
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub operation_type: OperationType,
    pub document_key: String,
    pub update_description: Option<UpdateDescription>,

    /// only set for inserts/replaces and for updates if the subscription asked for [`FullDocument::UpdateLookup`]
    pub full_document: Option<Document>,
}

/// do we want the post-update document or just the diff
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FullDocument {
    Default,
    UpdateLookup,
}

/// a server side match predicate for change feed subscriptions:
/// `operationType in operation_types AND (for each f in updated_fields: exists(updateDescription.updatedFields[f]))`
#[derive(Debug,Clone,PartialEq)]
pub struct ChangeFilter {
    pub operation_types: Vec<OperationType>,
    pub updated_fields: Vec<String>,
}

impl ChangeFilter {
    pub fn new ()->Self { ChangeFilter { operation_types: Vec::new(), updated_fields: Vec::new() } }

    pub fn operation (mut self, op: OperationType)->Self {
        self.operation_types.push(op);
        self
    }

    pub fn updated_field_exists (mut self, field: impl ToString)->Self {
        self.updated_fields.push( field.to_string());
        self
    }

    /// note that an empty operation type list matches all operations
    pub fn matches (&self, event: &ChangeEvent)->bool {
        if !self.operation_types.is_empty() && !self.operation_types.contains( &event.operation_type) {
            return false
        }

        if self.updated_fields.is_empty() {
            true
        } else if let Some(desc) = &event.update_description {
            self.updated_fields.iter().all( |f| desc.updated_fields.contains_key( f.as_str()))
        } else {
            false
        }
    }
}

impl fmt::Display for ChangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops: Vec<String> = self.operation_types.iter().map( |op| format!("\"{op}\"")).collect();
        write!( f, "operationType in [{}]", ops.join(","))?;
        for field in &self.updated_fields {
            write!( f, " AND exists(updateDescription.updatedFields.{field})")?;
        }
        Ok(())
    }
}

/* #endregion change events */

/* #region projections and updates ******************************************************************************/

/// which fields of a document to retrieve. `last_elements` adds computed fields that hold the last
/// element of an array field (or are omitted if the array is missing or empty), which is how we read
/// the most recent flight log entry without reading the whole log
#[derive(Debug,Clone,Default,PartialEq)]
pub struct Projection {
    /// empty means all fields
    pub include: Vec<String>,

    /// (array field, computed field name) pairs
    pub last_elements: Vec<(String,String)>,
}

impl Projection {
    pub fn all ()->Self { Projection::default() }

    pub fn fields (fields: &[&str])->Self {
        Projection { include: fields.iter().map( |f| f.to_string()).collect(), last_elements: Vec::new() }
    }

    pub fn with_last_element (mut self, array_field: &str, as_field: &str)->Self {
        self.last_elements.push( (array_field.to_string(), as_field.to_string()));
        self
    }

    pub fn apply (&self, doc: &Document)->Document {
        let mut projected = if self.include.is_empty() {
            doc.clone()
        } else {
            let mut p = Document::new();
            if let Some(id) = doc.get( fields::ID) { // id is always included
                p.insert( fields::ID.to_string(), id.clone());
            }
            for f in &self.include {
                if let Some(v) = doc.get( f.as_str()) {
                    p.insert( f.clone(), v.clone());
                }
            }
            p
        };

        for (array_field, as_field) in &self.last_elements {
            if let Some(last) = doc.get( array_field.as_str()).and_then( Value::as_array).and_then( |a| a.last()) {
                projected.insert( as_field.clone(), last.clone());
            }
        }

        projected
    }
}

/// a multi-field update that has to be applied atomically to a single document
#[derive(Debug,Clone,Default,PartialEq)]
pub struct DocumentUpdate {
    pub set: Document,

    /// (array field, value) pairs. Missing array fields are created
    pub push: Vec<(String,Value)>,
}

impl DocumentUpdate {
    pub fn new ()->Self { DocumentUpdate::default() }

    pub fn set (mut self, field: &str, value: impl Into<Value>)->Self {
        self.set.insert( field.to_string(), value.into());
        self
    }

    pub fn push (mut self, field: &str, value: impl Into<Value>)->Self {
        self.push.push( (field.to_string(), value.into()));
        self
    }

    pub fn sets_field (&self, field: &str)->bool {
        self.set.contains_key(field)
    }

    /// apply to given document and return the description of what changed. This fails (without
    /// modifying the document) if a push target exists but is not an array
    pub fn apply_to (&self, doc: &mut Document)->Result<UpdateDescription,String> {
        for (field,_) in &self.push {
            if let Some(v) = doc.get( field.as_str()) {
                if !v.is_array() && !v.is_null() {
                    return Err( format!("cannot push to non-array field '{field}'"))
                }
            }
        }

        let mut desc = UpdateDescription::default();

        for (k,v) in &self.set {
            doc.insert( k.clone(), v.clone());
            desc.updated_fields.insert( k.clone(), v.clone());
        }

        for (k,v) in &self.push {
            let entry = doc.entry( k.clone()).or_insert_with( || Value::Array(Vec::new()));
            if entry.is_null() {
                *entry = Value::Array(Vec::new());
            }
            if let Value::Array(a) = entry {
                a.push( v.clone());
                desc.updated_fields.insert( format!("{}.{}", k, a.len()-1), v.clone());
            }
        }

        Ok(desc)
    }
}

/* #endregion projections and updates */
