//! Data models for the seeded reference data.
//!
//! - `Department`: an organizational grouping that owns badges
//! - `MeritBadge`: a badge definition with its root requirements
//! - `Requirement`: a node of a badge's requirement tree
//! - `RecordId`: an identifier generated by the backend on insert

pub mod department;
pub mod merit_badge;
pub mod record;
pub mod requirement;

pub use department::Department;
pub use merit_badge::MeritBadge;
pub use record::RecordId;
pub use requirement::{count_all, Requirement};
