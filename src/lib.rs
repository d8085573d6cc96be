pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod utils;
