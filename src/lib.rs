pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod interfaces;
pub mod services;
pub mod utils;
