use serde::Deserialize;

use crate::error::Result;
use crate::{RouteID, ShapeID, Table, TripID};

/// Only used to join stop times and shapes to routes; never returned directly.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub shape_id: ShapeID,
}

pub fn load(table: &Table) -> Result<Vec<Trip>> {
    let mut trips = Vec::new();
    for rec in table.deserialize::<Record>()? {
        trips.push(Trip {
            trip_id: rec.trip_id,
            route_id: rec.route_id,
            shape_id: rec.shape_id,
        });
    }
    Ok(trips)
}

#[derive(Deserialize)]
struct Record {
    #[serde(default)]
    trip_id: TripID,
    #[serde(default)]
    route_id: RouteID,
    #[serde(default)]
    shape_id: ShapeID,
}
