//! Remote table store access.
//!
//! The seeders only need two operations from the backend, expressed by the
//! `Backend` trait: insert a row and get the stored row back, and look up a
//! single row by a case-insensitive name match.
//!
//! - `ApiClient`: PostgREST over HTTP, authenticated with an API key
//! - `MemoryBackend`: in-process tables for dry runs and tests

pub mod backend;
pub mod client;
pub mod error;
pub mod memory;

pub use backend::Backend;
pub use client::ApiClient;
pub use error::ApiError;
pub use memory::MemoryBackend;
