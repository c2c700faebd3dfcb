//! Core data model for dailies.
//!
//! This crate defines the records loaded from the MovieLens-style CSV
//! sources (movies, ratings, tags, genome tags and scores), the cell
//! values they flatten into, and the destination table schemas together
//! with their DDL for each supported SQL dialect.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use record::Record;
pub use schema::{Column, ColumnType, Dialect, TableSchema};
pub use value::Value;
