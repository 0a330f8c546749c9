pub mod admin_routes;
pub mod bike_routes;
pub mod rental_routes;
pub mod repair_routes;
pub mod route_routes;
pub mod station_routes;
