pub mod formula;
pub mod metadata;
pub mod records;
pub mod schema;
