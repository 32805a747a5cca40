//! Body rows and their conversion to and from the [`Body`] union.
//!
//! The `bodies` table stores every shape in one wide row. Reading a row picks
//! the columns whitelisted for its `type`; writing flattens the union back
//! into nullable columns.

use marbles_core::body::{Body, BodyShape, MARBLE, NOTE_BLOCK, TRACK_BLOCK};
use marbles_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A raw row from the `bodies` table.
#[derive(Debug, Clone, FromRow)]
pub struct BodyRow {
    pub id: DbId,
    pub track_id: DbId,
    #[sqlx(rename = "type")]
    pub body_type: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub is_static: bool,
    pub radius: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub front_color: Option<String>,
    pub back_color: Option<String>,
    pub gradient_start: Option<String>,
    pub gradient_end: Option<String>,
    pub camera_tracking: Option<bool>,
    pub note: Option<String>,
    pub octave: Option<String>,
    pub volume: Option<f64>,
}

/// A persisted body with its identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredBody {
    pub id: DbId,
    pub track_id: DbId,
    #[serde(flatten)]
    pub body: Body,
}

/// A stored row whose `type` is not one of the known body types.
#[derive(Debug, thiserror::Error)]
#[error("body {id} has unknown type '{body_type}'")]
pub struct UnknownBodyType {
    pub id: DbId,
    pub body_type: String,
}

impl TryFrom<BodyRow> for StoredBody {
    type Error = UnknownBodyType;

    fn try_from(row: BodyRow) -> Result<Self, Self::Error> {
        let shape = match row.body_type.as_str() {
            MARBLE => BodyShape::Marble {
                radius: row.radius,
                camera_tracking: row.camera_tracking.unwrap_or(false),
                gradient_start: row.gradient_start,
                gradient_end: row.gradient_end,
            },
            TRACK_BLOCK => BodyShape::TrackBlock {
                width: row.width,
                height: row.height,
                front_color: row.front_color,
                back_color: row.back_color,
            },
            NOTE_BLOCK => BodyShape::NoteBlock {
                width: row.width,
                height: row.height,
                gradient_start: row.gradient_start,
                gradient_end: row.gradient_end,
                note: row.note,
                octave: row.octave,
                volume: row.volume,
            },
            _ => {
                return Err(UnknownBodyType {
                    id: row.id,
                    body_type: row.body_type,
                })
            }
        };

        Ok(StoredBody {
            id: row.id,
            track_id: row.track_id,
            body: Body {
                x: row.x,
                y: row.y,
                rotation: row.rotation,
                is_static: row.is_static,
                shape,
            },
        })
    }
}

/// The nullable shape columns of a body, ready to bind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BodyColumns {
    pub radius: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub front_color: Option<String>,
    pub back_color: Option<String>,
    pub gradient_start: Option<String>,
    pub gradient_end: Option<String>,
    pub camera_tracking: Option<bool>,
    pub note: Option<String>,
    pub octave: Option<String>,
    pub volume: Option<f64>,
}

impl From<&BodyShape> for BodyColumns {
    fn from(shape: &BodyShape) -> Self {
        match shape {
            BodyShape::Marble {
                radius,
                camera_tracking,
                gradient_start,
                gradient_end,
            } => BodyColumns {
                radius: *radius,
                camera_tracking: Some(*camera_tracking),
                gradient_start: gradient_start.clone(),
                gradient_end: gradient_end.clone(),
                ..Default::default()
            },
            BodyShape::TrackBlock {
                width,
                height,
                front_color,
                back_color,
            } => BodyColumns {
                width: *width,
                height: *height,
                front_color: front_color.clone(),
                back_color: back_color.clone(),
                ..Default::default()
            },
            BodyShape::NoteBlock {
                width,
                height,
                gradient_start,
                gradient_end,
                note,
                octave,
                volume,
            } => BodyColumns {
                width: *width,
                height: *height,
                gradient_start: gradient_start.clone(),
                gradient_end: gradient_end.clone(),
                note: note.clone(),
                octave: octave.clone(),
                volume: *volume,
                ..Default::default()
            },
        }
    }
}
