pub mod classifier;
pub mod config;
pub mod db;
pub mod errors;
pub mod evaluate;
pub mod ingest;
pub mod models;
pub mod source;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod testutil;
