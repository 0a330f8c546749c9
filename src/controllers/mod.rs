pub mod bike_controller;
pub mod rental_controller;
pub mod repair_controller;
pub mod route_controller;
pub mod station_controller;
