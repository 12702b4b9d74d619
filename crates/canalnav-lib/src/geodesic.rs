//! Great-circle distance used as both edge cost and heuristic.
//!
//! Positions are stored as two-element coordinate pairs. Whether the first
//! element is the longitude or the latitude depends on the data producer, so
//! the order is part of the configuration rather than the data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::Junction;
use crate::search::DistanceOf;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A stored coordinate pair.
pub type Position = [f64; 2];

/// Meaning of the two elements of a [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateOrder {
    /// `[longitude, latitude]`, as written by the graph builder.
    #[default]
    LonLat,
    /// `[latitude, longitude]`.
    LatLon,
}

impl CoordinateOrder {
    /// Split a position into `(latitude, longitude)` degrees.
    pub fn lat_lon(self, position: Position) -> (f64, f64) {
        match self {
            CoordinateOrder::LonLat => (position[1], position[0]),
            CoordinateOrder::LatLon => (position[0], position[1]),
        }
    }

    /// The opposite ordering.
    pub fn reversed(self) -> Self {
        match self {
            CoordinateOrder::LonLat => CoordinateOrder::LatLon,
            CoordinateOrder::LatLon => CoordinateOrder::LonLat,
        }
    }
}

impl fmt::Display for CoordinateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            CoordinateOrder::LonLat => "lonlat",
            CoordinateOrder::LatLon => "latlon",
        };
        f.write_str(value)
    }
}

impl FromStr for CoordinateOrder {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lonlat" | "lon-lat" => Ok(CoordinateOrder::LonLat),
            "latlon" | "lat-lon" => Ok(CoordinateOrder::LatLon),
            _ => Err(Error::InvalidCoordinateOrder {
                value: value.to_string(),
            }),
        }
    }
}

/// Haversine distance in kilometres between two stored positions.
pub fn haversine_km(a: Position, b: Position, order: CoordinateOrder) -> f64 {
    let (lat1, lon1) = order.lat_lon(a);
    let (lat2, lon2) = order.lat_lon(b);

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `h` marginally above one for antipodal points.
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Haversine distance with the coordinate order given as a string.
///
/// Fails with [`Error::InvalidCoordinateOrder`] when `order` is neither
/// `lonlat` nor `latlon`.
pub fn geodesic_distance(a: Position, b: Position, order: &str) -> Result<f64> {
    let order = order.parse::<CoordinateOrder>()?;
    Ok(haversine_km(a, b, order))
}

/// Distance strategy that prices hops between junctions by great-circle
/// distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geodesic {
    order: CoordinateOrder,
}

impl Geodesic {
    pub fn new(order: CoordinateOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> CoordinateOrder {
        self.order
    }
}

impl<'g> DistanceOf<&'g Junction> for Geodesic {
    fn distance(&self, from: &&'g Junction, to: &&'g Junction) -> f64 {
        haversine_km(from.pos, to.pos, self.order)
    }
}
