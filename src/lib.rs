pub mod buffer;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod db;
pub mod error;
pub mod generator;
pub mod rest_client;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod tests;
