//! HTTP API handlers

pub mod health;
pub mod quiz;
pub mod translate;

pub use health::health_routes;
pub use quiz::quiz_routes;
pub use translate::translate_routes;
