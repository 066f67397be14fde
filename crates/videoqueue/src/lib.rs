pub mod api;
pub mod config;
pub mod db;
pub mod queue;
pub mod telemetry;
pub mod trigger;
