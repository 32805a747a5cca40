//! Domain logic for the marble track service.
//!
//! Everything in this crate is pure: no database or HTTP dependencies, so the
//! sanitizer and validation rules can be unit tested in isolation.

pub mod body;
pub mod error;
pub mod track;
pub mod types;
pub mod validation;
