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

use std::fmt;
use serde::{Serialize,Deserialize};
use geo::{Distance, Point};
use geo::algorithm::line_measures::metric_spaces::HaversineMeasure;
use uom::si::{f64::Length, length::meter};

/// semi major axis in meters. We use the equatorial radius for great circle distances so that
/// one degree of arc along the equator is about 69.17 statute miles
pub const EQUATORIAL_EARTH_RADIUS: f64 = 6378137.0;

/// geographic position in degrees. Note the serialized form is a `[lon,lat]` array, which is
/// the coordinate order of all position fields in the store
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(try_from = "[f64;2]", into = "[f64;2]")]
pub struct GeoPos {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPos {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64)->Self { GeoPos { lon, lat } }

    pub fn point (&self)->Point { Point::new( self.lon, self.lat) }

    pub fn is_valid (&self)->bool {
        self.lon.is_finite() && self.lat.is_finite() && self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lon, self.lat)
    }
}

impl TryFrom<[f64;2]> for GeoPos {
    type Error = String;

    fn try_from (lon_lat: [f64;2])->Result<Self,String> {
        let p = GeoPos { lon: lon_lat[0], lat: lon_lat[1] };
        if p.is_valid() { Ok(p) } else { Err( format!("not a valid [lon,lat] position: {p}")) }
    }
}

impl From<GeoPos> for [f64;2] {
    fn from (p: GeoPos)->Self { [p.lon, p.lat] }
}

/// haversine distance between two positions on a sphere with [`EQUATORIAL_EARTH_RADIUS`]
pub fn great_circle_distance (p1: &GeoPos, p2: &GeoPos)->Length {
    let dist = HaversineMeasure::new( EQUATORIAL_EARTH_RADIUS).distance( p1.point(), p2.point());
    Length::new::<meter>(dist)
}
