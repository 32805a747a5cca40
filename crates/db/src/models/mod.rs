//! Row structs and DTOs.
//!
//! Each submodule pairs a `FromRow` entity matching its table with the
//! input DTOs used for inserts.

pub mod body;
pub mod track;
pub mod user;
