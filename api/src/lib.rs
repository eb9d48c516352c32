pub mod aggregate;
pub mod config;
pub mod db;
pub mod errors;
pub mod format;
pub mod metrics;
pub mod model;
pub mod rest;
pub mod store;
pub mod validate;
