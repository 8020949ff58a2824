use serde::Deserialize;

use crate::error::Result;
use crate::{StopID, Table, TripID};

/// One trip visiting one stop. Only the two IDs matter for joins; times and sequence aren't read.
#[derive(Clone, Debug, PartialEq)]
pub struct StopTime {
    pub trip_id: TripID,
    pub stop_id: StopID,
}

pub fn load(table: &Table) -> Result<Vec<StopTime>> {
    let mut stop_times = Vec::new();
    for rec in table.deserialize::<Record>()? {
        stop_times.push(StopTime {
            trip_id: rec.trip_id,
            stop_id: rec.stop_id,
        });
    }
    Ok(stop_times)
}

#[derive(Deserialize)]
struct Record {
    #[serde(default)]
    trip_id: TripID,
    #[serde(default)]
    stop_id: StopID,
}
