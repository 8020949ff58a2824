use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::error::{Error, MissingTable, Result};
use crate::query::{Limits, ServingRoute, StopDetail, TransitOverview};
use crate::shapes::Coordinate;
use crate::{
    routes, shapes, stop_times, stops, trips, Route, RouteID, RouteType, ShapeID, Stop, StopID,
    StopTime, Table, TableLocator, Trip, TripID,
};

pub const STOPS: &str = "stops";
pub const ROUTES: &str = "routes";
pub const TRIPS: &str = "trips";
pub const STOP_TIMES: &str = "stop_times";
pub const SHAPES: &str = "shapes";

/// Every table the overview needs
pub const ALL_TABLES: [&str; 5] = [STOPS, ROUTES, TRIPS, STOP_TIMES, SHAPES];
/// Stop detail never looks at geometry
pub const TABLES_WITHOUT_SHAPES: [&str; 4] = [STOPS, ROUTES, TRIPS, STOP_TIMES];

/// A fully joined feed. Routes carry their geometry and friendly type, stops carry the mode
/// serving them.
#[derive(Clone)]
pub struct GTFS {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub shapes: BTreeMap<ShapeID, Vec<Coordinate>>,

    // Index into the lists above. When an ID is duplicated, the first record wins.
    stop_index: BTreeMap<StopID, usize>,
    route_index: BTreeMap<RouteID, usize>,
    trip_index: BTreeMap<TripID, usize>,
}

impl GTFS {
    pub fn load(locator: &TableLocator) -> Result<Self> {
        let paths = locator.locate_all(&ALL_TABLES)?;
        Self::load_from_paths(&ALL_TABLES, &paths)
    }

    pub fn load_without_shapes(locator: &TableLocator) -> Result<Self> {
        let paths = locator.locate_all(&TABLES_WITHOUT_SHAPES)?;
        Self::load_from_paths(&TABLES_WITHOUT_SHAPES, &paths)
    }

    /// `tables` and `paths` line up. shapes is optional here; everything else is required.
    pub fn load_from_paths(tables: &[&str], paths: &[PathBuf]) -> Result<Self> {
        let mut loaded = BTreeMap::new();
        for (table, path) in tables.iter().zip(paths) {
            loaded.insert(*table, Table::read_file(table, path)?);
        }

        let shapes = match loaded.remove(SHAPES) {
            Some(table) => shapes::load(&table)?,
            None => BTreeMap::new(),
        };
        let mut take = |table: &str| {
            loaded.remove(table).ok_or_else(|| {
                Error::TablesNotFound(vec![MissingTable {
                    table: table.to_string(),
                    candidates: Vec::new(),
                }])
            })
        };
        Ok(Self::new(
            stops::load(&take(STOPS)?)?,
            routes::load(&take(ROUTES)?)?,
            trips::load(&take(TRIPS)?)?,
            stop_times::load(&take(STOP_TIMES)?)?,
            shapes,
        ))
    }

    /// Joins already-parsed tables
    pub fn new(
        mut stops: Vec<Stop>,
        mut routes: Vec<Route>,
        trips: Vec<Trip>,
        stop_times: Vec<StopTime>,
        shapes: BTreeMap<ShapeID, Vec<Coordinate>>,
    ) -> Self {
        routes::attach_shapes(&mut routes, &trips, &shapes);

        let stop_index = index_by(&stops, |s| &s.stop_id);
        let route_index = index_by(&routes, |r| &r.route_id);
        let trip_index = index_by(&trips, |t| &t.trip_id);

        let route_per_trip: BTreeMap<&TripID, &RouteID> = trip_index
            .iter()
            .map(|(trip_id, idx)| (trip_id, &trips[*idx].route_id))
            .collect();
        let type_per_route: BTreeMap<&RouteID, RouteType> = route_index
            .iter()
            .map(|(route_id, idx)| (route_id, routes[*idx].route_type))
            .collect();
        let route_types = stops::derive_route_types(&stop_times, &route_per_trip, &type_per_route);
        stops::attach_route_types(&mut stops, &route_types);

        info!(
            "Assembled {} stops, {} routes, {} trips, {} stop times, {} shapes",
            stops.len(),
            routes.len(),
            trips.len(),
            stop_times.len(),
            shapes.len()
        );

        Self {
            stops,
            routes,
            trips,
            stop_times,
            shapes,
            stop_index,
            route_index,
            trip_index,
        }
    }

    pub fn stop(&self, stop_id: &StopID) -> Option<&Stop> {
        self.stop_index.get(stop_id).map(|idx| &self.stops[*idx])
    }

    pub fn route(&self, route_id: &RouteID) -> Option<&Route> {
        self.route_index.get(route_id).map(|idx| &self.routes[*idx])
    }

    pub fn trip(&self, trip_id: &TripID) -> Option<&Trip> {
        self.trip_index.get(trip_id).map(|idx| &self.trips[*idx])
    }

    /// None if the trip or its route don't exist
    pub fn route_for_trip(&self, trip_id: &TripID) -> Option<&Route> {
        self.route(&self.trip(trip_id)?.route_id)
    }

    pub fn overview(&self, limits: &Limits) -> TransitOverview {
        TransitOverview {
            stops: self.stops.iter().take(limits.stops).cloned().collect(),
            routes: self.routes.iter().take(limits.routes).cloned().collect(),
            total_stops: self.stops.len(),
            total_routes: self.routes.len(),
        }
    }

    /// The stop and every distinct route serving it, in order of first appearance in stop_times
    pub fn stop_detail(&self, stop_id: &StopID) -> Result<StopDetail> {
        let stop = self
            .stop(stop_id)
            .ok_or_else(|| Error::StopNotFound(stop_id.clone()))?;

        let mut seen = BTreeSet::new();
        let mut serving_routes = Vec::new();
        for st in self.stop_times.iter().filter(|st| &st.stop_id == stop_id) {
            if let Some(route) = self.route_for_trip(&st.trip_id) {
                if seen.insert(&route.route_id) {
                    serving_routes.push(ServingRoute::from(route));
                }
            }
        }

        Ok(StopDetail {
            stop: stop.clone(),
            serving_routes,
        })
    }
}

/// Blank IDs are left out, so nothing can resolve to them.
fn index_by<T, K, F>(list: &[T], key: F) -> BTreeMap<K, usize>
where
    K: Clone + Ord + AsRef<str>,
    F: Fn(&T) -> &K,
{
    let mut index = BTreeMap::new();
    let mut duplicates = 0;
    for (idx, x) in list.iter().enumerate() {
        let k = key(x);
        if k.as_ref().is_empty() {
            continue;
        }
        if index.contains_key(k) {
            duplicates += 1;
        } else {
            index.insert(k.clone(), idx);
        }
    }
    if duplicates > 0 {
        warn!("{duplicates} duplicate IDs; only the first of each is used");
    }
    index
}
