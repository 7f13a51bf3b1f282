//! HTTP API handlers for hitster-dates

pub mod health;
pub mod track_dates;

pub use health::health_routes;
pub use track_dates::track_dates_routes;
