pub mod bounds;
pub mod config;
pub mod error_handler;
pub mod geo;
