pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod model;
pub mod prediction;
pub mod repository;
pub mod standings;
pub mod state;
