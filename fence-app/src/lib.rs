pub mod app;
pub mod cli;
pub mod config;
pub mod csv_export;
pub mod logging;
pub mod utils;
