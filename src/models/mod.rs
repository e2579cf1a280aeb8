//! Data models for localstore.
//!
//! Rows are positional: column values are addressed by index, never by name.

mod value;

pub use value::{Row, Value};
