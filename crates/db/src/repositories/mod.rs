//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod body_repo;
pub mod track_repo;
pub mod user_repo;

pub use body_repo::BodyRepo;
pub use track_repo::TrackRepo;
pub use user_repo::UserRepo;
