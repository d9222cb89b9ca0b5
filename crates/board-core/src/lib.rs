//! Core types and trait definitions for the discussion board.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; the storage backend and the JSON API are
//! layered on top of the traits in [`store`].

pub mod comment;
pub mod engagement;
pub mod error;
pub mod store;
pub mod subject;
pub mod user;
pub mod view;

pub use error::{Error, Result};
