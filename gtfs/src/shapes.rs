use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::{ShapeID, Table};

/// `[longitude, latitude]`
pub type Coordinate = [f64; 2];

/// A single parsed row of shapes.txt
#[derive(Clone, Debug, PartialEq)]
pub struct ShapePoint {
    pub shape_id: ShapeID,
    pub sequence: i64,
    pub pos: Coordinate,
}

impl ShapePoint {
    fn parse(rec: &Record) -> Option<Self> {
        if rec.shape_id.is_empty() {
            return None;
        }
        let sequence = rec.shape_pt_sequence.parse::<i64>().ok()?;
        let lon = rec.shape_pt_lon.parse::<f64>().ok()?;
        let lat = rec.shape_pt_lat.parse::<f64>().ok()?;
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        Some(Self {
            shape_id: rec.shape_id.clone(),
            sequence,
            pos: [lon, lat],
        })
    }
}

pub fn load(table: &Table) -> Result<BTreeMap<ShapeID, Vec<Coordinate>>> {
    let records: Vec<Record> = table.deserialize()?;
    let total = records.len();

    let mut points = Vec::with_capacity(total);
    for rec in records {
        match ShapePoint::parse(&rec) {
            Some(pt) => points.push(pt),
            None => debug!("Skipping malformed shape point {:?}", rec),
        }
    }
    if points.len() < total {
        warn!(
            "Dropped {} of {} shape points that didn't parse",
            total - points.len(),
            total
        );
    }
    Ok(assemble(points))
}

/// Groups points per shape, ordered by sequence. Points sharing a sequence number keep their
/// input order.
pub fn assemble(points: Vec<ShapePoint>) -> BTreeMap<ShapeID, Vec<Coordinate>> {
    let mut pts_per_shape: BTreeMap<ShapeID, Vec<(i64, Coordinate)>> = BTreeMap::new();
    for pt in points {
        pts_per_shape
            .entry(pt.shape_id)
            .or_insert_with(Vec::new)
            .push((pt.sequence, pt.pos));
    }

    // Sort by shape_pt_sequence, in case the file isn't in order
    let mut results = BTreeMap::new();
    for (shape_id, mut pts) in pts_per_shape {
        pts.sort_by_key(|(seq, _)| *seq);
        results.insert(shape_id, pts.into_iter().map(|(_, pos)| pos).collect());
    }
    results
}

#[derive(Clone, Debug, Deserialize)]
struct Record {
    #[serde(default)]
    shape_id: ShapeID,
    #[serde(default)]
    shape_pt_lat: String,
    #[serde(default)]
    shape_pt_lon: String,
    #[serde(default)]
    shape_pt_sequence: String,
}
