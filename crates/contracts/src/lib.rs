//! Shared contracts: domain aggregates of the data-collection platform and the
//! pure schema & record engine (field registry, field sets, record validation
//! and formatting, formulas).
//!
//! Nothing in this crate performs I/O; persistence lives behind the store
//! traits of the `backend` crate.

pub mod domain;
pub mod enums;
pub mod shared;
pub mod system;
