use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{RouteID, RouteType, StopID, StopTime, Table, TripID};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stop {
    pub stop_id: StopID,
    #[serde(rename = "stop_code")]
    pub code: String,
    #[serde(rename = "stop_name")]
    pub name: String,
    #[serde(rename = "stop_desc")]
    pub description: String,
    /// None if missing or unparseable
    #[serde(rename = "stop_lat")]
    pub lat: Option<f64>,
    #[serde(rename = "stop_lon")]
    pub lon: Option<f64>,
    /// The mode of the first route found serving this stop. Buses if nothing serves it.
    pub route_type: RouteType,
}

impl Stop {
    /// `[longitude, latitude]`, if both are known
    pub fn pos(&self) -> Option<[f64; 2]> {
        Some([self.lon?, self.lat?])
    }
}

/// Stops in file order
pub fn load(table: &Table) -> Result<Vec<Stop>> {
    let mut stops = Vec::new();
    for rec in table.deserialize::<Record>()? {
        stops.push(Stop {
            stop_id: rec.stop_id,
            code: rec.stop_code,
            name: rec.stop_name,
            description: rec.stop_desc,
            lat: parse_coordinate(&rec.stop_lat),
            lon: parse_coordinate(&rec.stop_lon),
            route_type: RouteType::default(),
        });
    }
    Ok(stops)
}

fn parse_coordinate(x: &str) -> Option<f64> {
    x.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// For every stop visited by some trip, the mode of the first route (in stop_times order) that
/// resolves through trip -> route. Stop times with a blank ID, or whose trip or route can't be
/// found, are skipped.
pub fn derive_route_types(
    stop_times: &[StopTime],
    route_per_trip: &BTreeMap<&TripID, &RouteID>,
    type_per_route: &BTreeMap<&RouteID, RouteType>,
) -> BTreeMap<StopID, RouteType> {
    let mut results = BTreeMap::new();
    let mut unresolved = 0;
    for st in stop_times {
        if st.trip_id.is_empty() || st.stop_id.is_empty() {
            unresolved += 1;
            continue;
        }
        let route_type = route_per_trip
            .get(&st.trip_id)
            .and_then(|route_id| type_per_route.get(route_id));
        match route_type {
            Some(route_type) => {
                results.entry(st.stop_id.clone()).or_insert(*route_type);
            }
            None => {
                unresolved += 1;
            }
        }
    }
    if unresolved > 0 {
        warn!("{unresolved} stop times don't resolve to a known trip and route");
    }
    results
}

pub fn attach_route_types(stops: &mut [Stop], route_types: &BTreeMap<StopID, RouteType>) {
    for stop in stops {
        stop.route_type = route_types
            .get(&stop.stop_id)
            .copied()
            .unwrap_or_default();
    }
}

#[derive(Deserialize)]
struct Record {
    #[serde(default)]
    stop_id: StopID,
    #[serde(default)]
    stop_code: String,
    #[serde(default)]
    stop_name: String,
    #[serde(default)]
    stop_desc: String,
    #[serde(default)]
    stop_lat: String,
    #[serde(default)]
    stop_lon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_time(trip_id: &str, stop_id: &str) -> StopTime {
        StopTime {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
        }
    }

    #[test]
    fn lenient_coordinates() {
        let table = Table::parse(
            "stops",
            b"stop_id,stop_name,stop_lat,stop_lon\ns1,Gion,35.0037,135.7778\ns2,Nowhere,,east\n",
        )
        .unwrap();
        let stops = load(&table).unwrap();
        assert_eq!(stops[0].pos(), Some([135.7778, 35.0037]));
        assert_eq!(stops[1].lat, None);
        assert_eq!(stops[1].pos(), None);
        assert_eq!(stops[1].route_type, RouteType::Bus);
    }

    #[test]
    fn first_route_wins() {
        let (t1, t2, t3) = (TripID::from("t1"), TripID::from("t2"), TripID::from("t3"));
        let (subway, ferry) = (RouteID::from("subway"), RouteID::from("ferry"));
        // Not in routes.txt
        let ghost = RouteID::from("ghost");
        let mut route_per_trip = BTreeMap::new();
        route_per_trip.insert(&t1, &subway);
        route_per_trip.insert(&t2, &ferry);
        route_per_trip.insert(&t3, &ghost);
        let mut type_per_route = BTreeMap::new();
        type_per_route.insert(&subway, RouteType::Subway);
        type_per_route.insert(&ferry, RouteType::Ferry);

        let result = derive_route_types(
            &[
                stop_time("t3", "a"),
                stop_time("t2", "a"),
                stop_time("t1", "a"),
                stop_time("t1", "b"),
                stop_time("unknown_trip", "c"),
            ],
            &route_per_trip,
            &type_per_route,
        );
        assert_eq!(result[&StopID::from("a")], RouteType::Ferry);
        assert_eq!(result[&StopID::from("b")], RouteType::Subway);
        assert!(!result.contains_key(&StopID::from("c")));

        let table = Table::parse("stops", b"stop_id\na\nb\nc\n").unwrap();
        let mut stops = load(&table).unwrap();
        attach_route_types(&mut stops, &result);
        let types: Vec<RouteType> = stops.iter().map(|s| s.route_type).collect();
        assert_eq!(types, vec![RouteType::Ferry, RouteType::Subway, RouteType::Bus]);
    }

    #[test]
    fn blank_ids_never_join() {
        let (blank_trip, subway) = (TripID::default(), RouteID::from("subway"));
        let mut route_per_trip = BTreeMap::new();
        route_per_trip.insert(&blank_trip, &subway);
        let mut type_per_route = BTreeMap::new();
        type_per_route.insert(&subway, RouteType::Subway);

        let result = derive_route_types(
            &[stop_time("", "a"), stop_time("t1", "")],
            &route_per_trip,
            &type_per_route,
        );
        assert!(result.is_empty());
    }
}
