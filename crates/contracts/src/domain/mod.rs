pub mod a001_project;
pub mod a002_project_member;
pub mod a003_collection;
pub mod a004_field_definition;
pub mod a005_data_record;
pub mod common;
