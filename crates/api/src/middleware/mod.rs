//! Request extractors that run before handlers.
//!
//! - [`auth::AuthContext`] -- Optional caller identity from a Bearer token.

pub mod auth;
