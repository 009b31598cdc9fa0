pub mod business;
pub mod config;
pub mod handlers;
pub mod kubernetes;
pub mod logging;
pub mod models;
pub mod prometheus;
pub mod server;
pub mod status;
