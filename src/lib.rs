pub mod cache;
pub mod cli;
pub mod config;
pub mod demo;
pub mod logging;
pub mod utils;
