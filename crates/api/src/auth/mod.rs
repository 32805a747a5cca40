//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT issuing and verification.

pub mod jwt;
pub mod password;
