use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shapes::Coordinate;
use crate::{RouteID, ShapeID, Table, Trip};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub route_id: RouteID,
    #[serde(rename = "route_short_name")]
    pub short_name: String,
    #[serde(rename = "route_long_name")]
    pub long_name: String,
    #[serde(rename = "route_desc")]
    pub description: String,
    /// Exactly as it appears in routes.txt
    #[serde(skip)]
    pub route_type_code: String,
    pub route_type: RouteType,
    /// Filled out by `attach_shapes`; empty if no trip of this route references a known shape
    pub shapes: Vec<Coordinate>,
}

/// The basic GTFS modes. Extended codes and anything unparseable are treated as buses.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Tram,
    Subway,
    Rail,
    #[default]
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
}

impl RouteType {
    pub fn all() -> Vec<Self> {
        use RouteType::*;
        vec![Tram, Subway, Rail, Bus, Ferry, CableCar, Gondola, Funicular]
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().parse::<u16>() {
            Ok(0) => RouteType::Tram,
            Ok(1) => RouteType::Subway,
            Ok(2) => RouteType::Rail,
            Ok(4) => RouteType::Ferry,
            Ok(5) => RouteType::CableCar,
            Ok(6) => RouteType::Gondola,
            Ok(7) => RouteType::Funicular,
            _ => RouteType::Bus,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            RouteType::Tram => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableCar => 5,
            RouteType::Gondola => 6,
            RouteType::Funicular => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RouteType::Tram => "tram",
            RouteType::Subway => "subway",
            RouteType::Rail => "rail",
            RouteType::Bus => "bus",
            RouteType::Ferry => "ferry",
            RouteType::CableCar => "cable_car",
            RouteType::Gondola => "gondola",
            RouteType::Funicular => "funicular",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Route {
    pub fn describe(&self) -> String {
        let name = [&self.short_name, &self.long_name, &self.description]
            .into_iter()
            .find(|x| !x.is_empty())
            .cloned()
            .unwrap_or_else(|| self.route_id.to_string());
        format!("{name} ({})", self.route_type)
    }
}

/// Routes in file order
pub fn load(table: &Table) -> Result<Vec<Route>> {
    let mut routes = Vec::new();
    for rec in table.deserialize::<Record>()? {
        routes.push(Route {
            route_type: RouteType::from_code(&rec.route_type),
            route_id: rec.route_id,
            short_name: rec.route_short_name,
            long_name: rec.route_long_name,
            description: rec.route_desc,
            route_type_code: rec.route_type,
            shapes: Vec::new(),
        });
    }
    Ok(routes)
}

/// Gives each route the geometry of a shape used by one of its trips. When trips of one route
/// use different shapes, the last trip in file order wins.
pub fn attach_shapes(
    routes: &mut [Route],
    trips: &[Trip],
    shapes: &BTreeMap<ShapeID, Vec<Coordinate>>,
) {
    let mut shape_per_route: BTreeMap<&RouteID, &ShapeID> = BTreeMap::new();
    let mut unknown_shapes = 0;
    for trip in trips {
        if trip.route_id.is_empty() || trip.shape_id.is_empty() {
            continue;
        }
        if shapes.contains_key(&trip.shape_id) {
            shape_per_route.insert(&trip.route_id, &trip.shape_id);
        } else {
            unknown_shapes += 1;
        }
    }
    if unknown_shapes > 0 {
        warn!("{unknown_shapes} trips reference shapes that don't exist");
    }

    for route in routes {
        route.shapes = shape_per_route
            .get(&route.route_id)
            .map(|shape_id| shapes[*shape_id].clone())
            .unwrap_or_default();
    }
}

#[derive(Deserialize)]
struct Record {
    #[serde(default)]
    route_id: RouteID,
    #[serde(default)]
    route_short_name: String,
    #[serde(default)]
    route_long_name: String,
    #[serde(default)]
    route_desc: String,
    #[serde(default)]
    route_type: String,
}
