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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinFleetError>;

/// odin_fleet specific error type. Errors are passed across tasks (e.g. through change feed channels)
/// and hence need to be Clone, which is why foreign errors are mapped into opaque String payloads
#[derive(Error,Debug,Clone,PartialEq)]
pub enum OdinFleetError {
    #[error("IO error {0}")]
    IOError(String),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("JSON error {0}")]
    JsonError(String),

    #[error("store error {0}")]
    StoreError(String),

    #[error("change feed error {0}")]
    FeedError(String),

    #[error("change feed closed")]
    FeedClosed,

    #[error("record not populated: {0}")]
    NotPopulated(String),

    #[error("vehicle {0} does not exist")]
    NoSuchVehicle(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

macro_rules! map_to_opaque_error {
    ($from_error:ty => $to_error:ident :: $variant:ident) => {
        impl From<$from_error> for $to_error {
            fn from (e: $from_error)->Self { $to_error :: $variant ( e.to_string()) }
        }
    };
}

map_to_opaque_error!{ std::io::Error => OdinFleetError::IOError }
map_to_opaque_error!{ serde_json::Error => OdinFleetError::JsonError }
map_to_opaque_error!{ ron::error::SpannedError => OdinFleetError::ConfigError }

pub fn op_failed (msg: impl ToString)->OdinFleetError {
    OdinFleetError::OpFailed(msg.to_string())
}

pub fn store_error (msg: impl ToString)->OdinFleetError {
    OdinFleetError::StoreError(msg.to_string())
}

pub fn feed_error (msg: impl ToString)->OdinFleetError {
    OdinFleetError::FeedError(msg.to_string())
}

pub fn not_populated_error (msg: impl ToString)->OdinFleetError {
    OdinFleetError::NotPopulated(msg.to_string())
}

#[macro_export]
macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::op_failed( format!( $fmt $(, $arg)* ))
    };
}

macro_rules! not_populated {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::not_populated_error( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use not_populated;
