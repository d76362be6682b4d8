pub mod pathfinder;

pub use pathfinder::{
    Pathfinder, RouteSearch, SearchOptions, find_best_route, find_routes, find_shortest_route,
    format_route, route_exists,
};
