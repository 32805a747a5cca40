//! Repository for the `tracks` table.
//!
//! Writes that touch both `tracks` and `bodies` run in one transaction so a
//! failure never leaves a track with a partial body set.

use marbles_core::track::TrackSubmission;
use marbles_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::track::{Track, TrackSummary, TrackWithBodies};
use crate::repositories::BodyRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, preview_on_playback, volume";

/// Summary projection joined with the owning user.
const SUMMARY_SELECT: &str = "SELECT t.id, t.name, u.username \
                              FROM tracks t JOIN users u ON u.id = t.user_id";

/// Provides CRUD operations for tracks and their bodies.
pub struct TrackRepo;

impl TrackRepo {
    /// Insert a track and its bodies, returning the new track ID.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &TrackSubmission,
    ) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let track_id: DbId = sqlx::query_scalar(
            "INSERT INTO tracks (user_id, name, preview_on_playback, volume)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.preview_on_playback)
        .bind(input.volume)
        .fetch_one(&mut *tx)
        .await?;

        BodyRepo::insert_many(&mut tx, track_id, &input.bodies).await?;

        tx.commit().await?;
        Ok(track_id)
    }

    /// Find a track row by its ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = $1");
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a track and load its bodies.
    ///
    /// Both reads share one repeatable-read snapshot, so a concurrent
    /// `replace` is seen entirely or not at all.
    pub async fn find_with_bodies(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TrackWithBodies>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let Some(track) = Self::find_by_id(&mut *tx, id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        let initial_state = BodyRepo::list_for_track(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(Some(TrackWithBodies {
            track,
            initial_state,
        }))
    }

    /// The most recent tracks across all users, newest first.
    pub async fn list_summaries(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<TrackSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} ORDER BY t.id DESC LIMIT $1");
        sqlx::query_as::<_, TrackSummary>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every track owned by one user, newest first.
    pub async fn list_summaries_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TrackSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE t.user_id = $1 ORDER BY t.id DESC");
        sqlx::query_as::<_, TrackSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a track's fields and replace its entire body set.
    ///
    /// Returns `false` if no row with the given `id` exists.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        input: &TrackSubmission,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE tracks SET name = $2, preview_on_playback = $3, volume = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.preview_on_playback)
        .bind(input.volume)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        BodyRepo::delete_for_track(&mut tx, id).await?;
        BodyRepo::insert_many(&mut tx, id, &input.bodies).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a track and its bodies.
    ///
    /// Returns `false` if no row with the given `id` exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        BodyRepo::delete_for_track(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
