pub mod cleaning;
pub mod config;
pub mod importers;
pub mod models;
pub mod services;
pub mod utils;
