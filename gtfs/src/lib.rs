//! Assembles a static GTFS feed from its text files: route geometry from shapes, the mode of
//! transit serving each stop, and the routes serving one stop. Every query rebuilds everything
//! from disk unless it goes through a `FeedCache`.

#[macro_use]
extern crate log;

mod cache;
mod config;
mod error;
mod feed;
mod ids;
mod query;
mod routes;
mod shapes;
mod stop_times;
mod stops;
mod table;
mod trips;

pub use cache::FeedCache;
pub use config::{Config, DATA_DIR_ENV};
pub use error::{Error, MissingTable, Result};
pub use feed::{ALL_TABLES, GTFS, ROUTES, SHAPES, STOPS, STOP_TIMES, TABLES_WITHOUT_SHAPES, TRIPS};
pub use ids::{RouteID, ShapeID, StopID, TripID};
pub use query::{
    get_stop_detail, get_transit_overview, Limits, ServingRoute, StopDetail, TransitOverview,
};
pub use routes::{Route, RouteType};
pub use shapes::{assemble as assemble_shapes, Coordinate, ShapePoint};
pub use stop_times::StopTime;
pub use stops::Stop;
pub use table::{Row, Table, TableLocator};
pub use trips::Trip;
