pub mod cascade;
pub mod config;
pub mod data;
pub mod error;
