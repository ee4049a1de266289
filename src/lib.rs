// Hydrology Open Data client - library root

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
