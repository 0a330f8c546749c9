pub mod bike_dto;
pub mod common_dto;
pub mod rental_dto;
pub mod repair_dto;
pub mod route_dto;
pub mod station_dto;
