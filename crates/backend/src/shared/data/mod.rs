pub mod db;
pub mod memory_store;
pub mod store;
