//! CLI command implementations.

pub mod check;
pub mod createdb;
pub mod ls;
pub mod stats;
