//! Repository for the `bodies` table.

use marbles_core::body::Body;
use marbles_core::types::DbId;
use sqlx::{PgExecutor, Postgres, QueryBuilder, Transaction};

use crate::models::body::{BodyColumns, BodyRow, StoredBody};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, track_id, type, x, y, rotation, is_static, radius, width, height, \
                       front_color, back_color, gradient_start, gradient_end, camera_tracking, \
                       note, octave, volume";

/// Rows per multi-row INSERT. Each row binds 17 parameters; Postgres allows 65535.
const INSERT_CHUNK: usize = 1000;

/// Provides read and bulk write operations for bodies.
pub struct BodyRepo;

impl BodyRepo {
    /// List the bodies of a track in insertion order.
    ///
    /// Rows with an unrecognised `type` are logged and skipped.
    pub async fn list_for_track<'e>(
        executor: impl PgExecutor<'e>,
        track_id: DbId,
    ) -> Result<Vec<StoredBody>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bodies WHERE track_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, BodyRow>(&query)
            .bind(track_id)
            .fetch_all(executor)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match StoredBody::try_from(row) {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::warn!(track_id, error = %e, "Skipping stored body");
                    None
                }
            })
            .collect())
    }

    /// Insert every body for a track inside the caller's transaction.
    pub async fn insert_many(
        tx: &mut Transaction<'_, Postgres>,
        track_id: DbId,
        bodies: &[Body],
    ) -> Result<(), sqlx::Error> {
        for chunk in bodies.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO bodies (track_id, type, x, y, rotation, is_static, radius, width, \
                 height, front_color, back_color, gradient_start, gradient_end, camera_tracking, \
                 note, octave, volume) ",
            );
            builder.push_values(chunk, |mut row, body| {
                let columns = BodyColumns::from(&body.shape);
                row.push_bind(track_id)
                    .push_bind(body.shape.type_name())
                    .push_bind(body.x)
                    .push_bind(body.y)
                    .push_bind(body.rotation)
                    .push_bind(body.is_static)
                    .push_bind(columns.radius)
                    .push_bind(columns.width)
                    .push_bind(columns.height)
                    .push_bind(columns.front_color)
                    .push_bind(columns.back_color)
                    .push_bind(columns.gradient_start)
                    .push_bind(columns.gradient_end)
                    .push_bind(columns.camera_tracking)
                    .push_bind(columns.note)
                    .push_bind(columns.octave)
                    .push_bind(columns.volume);
            });
            builder.build().execute(&mut **tx).await?;
        }
        Ok(())
    }

    /// Remove every body of a track inside the caller's transaction.
    pub async fn delete_for_track(
        tx: &mut Transaction<'_, Postgres>,
        track_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bodies WHERE track_id = $1")
            .bind(track_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
