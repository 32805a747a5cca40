//! User entity model and DTOs.

use marbles_core::types::DbId;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash, so it is never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
}
