//! Seeding of camp reference data into a hosted table API.
//!
//! Departments and the merit badge catalog are read from JSON files on disk,
//! turned into rows, and inserted one call at a time through a [`Backend`].
//! Badge requirements form trees; each node is inserted after its parent so
//! the parent's generated id can be stored on the child row.
//!
//! [`Backend`]: api::Backend

pub mod api;
pub mod config;
pub mod models;
pub mod schema;
pub mod seed;
pub mod source;
pub mod utils;
