use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde::Serialize;

use crate::error::Result;
use crate::{Config, Route, RouteID, RouteType, Stop, StopID, GTFS};

/// Caps on how much of the feed an overview returns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub stops: usize,
    pub routes: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitOverview {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    /// Before applying `Limits`
    pub total_stops: usize,
    pub total_routes: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopDetail {
    pub stop: Stop,
    pub serving_routes: Vec<ServingRoute>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServingRoute {
    pub route_id: RouteID,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: RouteType,
}

impl From<&Route> for ServingRoute {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.route_id.clone(),
            route_short_name: route.short_name.clone(),
            route_long_name: route.long_name.clone(),
            route_type: route.route_type,
        }
    }
}

/// Reads and joins every table from scratch, then summarizes the feed.
pub fn get_transit_overview(config: &Config) -> Result<TransitOverview> {
    let gtfs = GTFS::load(&config.locator())?;
    Ok(gtfs.overview(&config.limits()))
}

/// Reads and joins every table except shapes from scratch, then describes one stop.
pub fn get_stop_detail(config: &Config, stop_id: &StopID) -> Result<StopDetail> {
    let gtfs = GTFS::load_without_shapes(&config.locator())?;
    gtfs.stop_detail(stop_id)
}

impl TransitOverview {
    /// Routes become LineStrings and stops become Points. Routes with fewer than two points and
    /// stops without coordinates are left out.
    pub fn to_geojson(&self) -> GeoJson {
        let mut features = Vec::new();

        for route in &self.routes {
            if route.shapes.len() < 2 {
                continue;
            }
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::LineString(
                    route.shapes.iter().map(|pt| pt.to_vec()).collect(),
                ))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("type", "route");
            feature.set_property("route_id", route.route_id.as_str());
            feature.set_property("name", route.describe());
            feature.set_property("route_type", route.route_type.name());
            features.push(feature);
        }

        for stop in &self.stops {
            let Some(pos) = stop.pos() else {
                continue;
            };
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(pos.to_vec()))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("type", "stop");
            feature.set_property("stop_id", stop.stop_id.as_str());
            feature.set_property("name", stop.name.as_str());
            feature.set_property("route_type", stop.route_type.name());
            features.push(feature);
        }

        GeoJson::FeatureCollection(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{routes, stops, ShapeID, Table};

    fn overview() -> TransitOverview {
        let stops = stops::load(
            &Table::parse(
                "stops",
                b"stop_id,stop_name,stop_lat,stop_lon\ns1,Arashiyama,35.0094,135.6668\ns2,Unknown,,\n",
            )
            .unwrap(),
        )
        .unwrap();
        let routes = routes::load(
            &Table::parse(
                "routes",
                b"route_id,route_short_name,route_type\nr1,Randen,0\nr2,Point,3\nr3,None,3\n",
            )
            .unwrap(),
        )
        .unwrap();
        let trips = crate::trips::load(
            &Table::parse("trips", b"trip_id,route_id,shape_id\nt1,r1,line\nt2,r2,dot\n")
                .unwrap(),
        )
        .unwrap();
        let mut shapes = BTreeMap::new();
        shapes.insert(ShapeID::from("line"), vec![[135.66, 35.0], [135.67, 35.01]]);
        shapes.insert(ShapeID::from("dot"), vec![[135.0, 35.0]]);
        let gtfs = GTFS::new(stops, routes, trips, Vec::new(), shapes);
        gtfs.overview(&Limits {
            stops: 10,
            routes: 10,
        })
    }

    #[test]
    fn geojson_export() {
        let gj = overview().to_geojson();
        let GeoJson::FeatureCollection(fc) = gj else {
            panic!("expected a FeatureCollection");
        };
        // r2 has a single point, r3 has none, s2 has no position
        assert_eq!(fc.features.len(), 2);

        let route = &fc.features[0];
        assert_eq!(
            route.property("route_id"),
            Some(&serde_json::json!("r1"))
        );
        assert_eq!(route.property("route_type"), Some(&serde_json::json!("tram")));
        assert_eq!(route.property("name"), Some(&serde_json::json!("Randen (tram)")));

        let stop = &fc.features[1];
        assert_eq!(stop.property("stop_id"), Some(&serde_json::json!("s1")));
        assert_eq!(
            stop.geometry.as_ref().unwrap().value,
            Value::Point(vec![135.6668, 35.0094])
        );
    }

    #[test]
    fn overview_json_shape() {
        let json = serde_json::to_value(overview()).unwrap();
        assert_eq!(json["total_stops"], 2);
        assert_eq!(json["total_routes"], 3);
        assert_eq!(json["routes"][0]["route_type"], "tram");
        assert_eq!(json["routes"][0]["route_short_name"], "Randen");
        assert_eq!(
            json["routes"][0]["shapes"],
            serde_json::json!([[135.66, 35.0], [135.67, 35.01]])
        );
        assert_eq!(json["routes"][2]["shapes"], serde_json::json!([]));
        assert_eq!(json["stops"][1]["stop_lat"], serde_json::Value::Null);
        assert_eq!(json["stops"][0]["route_type"], "bus");
    }
}
