//! Integration tests for the user, track and body repositories.
//!
//! Exercises the repository layer against a real database:
//! - Track creation with bodies and per-type reads
//! - Full replacement of the body set
//! - Transaction rollback on a failed body insert
//! - Listing order and limits
//! - Unique and check constraint violations

use assert_matches::assert_matches;
use marbles_core::body::{Body, BodyShape};
use marbles_core::track::TrackSubmission;
use marbles_db::models::user::CreateUser;
use marbles_db::repositories::{BodyRepo, TrackRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn marble(x: f64) -> Body {
    Body {
        x,
        y: 0.0,
        rotation: 0.0,
        is_static: false,
        shape: BodyShape::Marble {
            radius: Some(8.0),
            camera_tracking: true,
            gradient_start: None,
            gradient_end: None,
        },
    }
}

fn note_block(volume: Option<f64>) -> Body {
    Body {
        x: 10.0,
        y: 20.0,
        rotation: 1.5,
        is_static: true,
        shape: BodyShape::NoteBlock {
            width: Some(40.0),
            height: Some(10.0),
            gradient_start: Some("#111".into()),
            gradient_end: Some("#eee".into()),
            note: Some("C#".into()),
            octave: Some("4".into()),
            volume,
        },
    }
}

fn submission(name: &str, bodies: Vec<Body>) -> TrackSubmission {
    TrackSubmission {
        name: name.to_string(),
        preview_on_playback: true,
        volume: 0.5,
        bodies,
    }
}

async fn body_count(pool: &PgPool, track_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM bodies WHERE track_id = $1")
        .bind(track_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_find_user_by_username(pool: PgPool) {
    let id = new_user(&pool, "marbler").await;

    let user = UserRepo::find_by_username(&pool, "marbler")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(user.id, id);
    assert!(UserRepo::username_exists(&pool, "marbler").await.unwrap());
    assert!(!UserRepo::username_exists(&pool, "Marbler").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_username_rejected(pool: PgPool) {
    new_user(&pool, "twin").await;
    let result = UserRepo::create(
        &pool,
        &CreateUser {
            username: "twin".into(),
            password_hash: "x".into(),
        },
    )
    .await;

    let err = result.unwrap_err();
    let db_err = err.as_database_error().expect("should be a database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_users_username"));
}

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_fetch_track_with_bodies(pool: PgPool) {
    let user_id = new_user(&pool, "builder").await;
    let track_id = TrackRepo::create(
        &pool,
        user_id,
        &submission("Spiral", vec![marble(1.0), note_block(Some(0.7))]),
    )
    .await
    .unwrap();

    let track = TrackRepo::find_with_bodies(&pool, track_id)
        .await
        .unwrap()
        .expect("track should exist");

    assert_eq!(track.track.user_id, user_id);
    assert_eq!(track.track.name, "Spiral");
    assert!(track.track.preview_on_playback);
    assert_eq!(track.initial_state.len(), 2);
    assert!(track.initial_state.iter().all(|b| b.track_id == track_id));
    assert_eq!(track.initial_state[0].body, marble(1.0));
    assert_eq!(track.initial_state[1].body, note_block(Some(0.7)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_track_without_bodies(pool: PgPool) {
    let user_id = new_user(&pool, "minimalist").await;
    let track_id = TrackRepo::create(&pool, user_id, &submission("Empty", vec![]))
        .await
        .unwrap();

    let track = TrackRepo::find_with_bodies(&pool, track_id)
        .await
        .unwrap()
        .unwrap();
    assert!(track.initial_state.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_nonexistent_returns_none(pool: PgPool) {
    assert!(TrackRepo::find_with_bodies(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_swaps_the_body_set(pool: PgPool) {
    let user_id = new_user(&pool, "editor").await;
    let track_id = TrackRepo::create(
        &pool,
        user_id,
        &submission("Draft", vec![marble(1.0), marble(2.0)]),
    )
    .await
    .unwrap();
    let old_ids: Vec<i64> = BodyRepo::list_for_track(&pool, track_id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();

    let replaced = TrackRepo::replace(&pool, track_id, &submission("Final", vec![note_block(None)]))
        .await
        .unwrap();
    assert!(replaced);

    let track = TrackRepo::find_with_bodies(&pool, track_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(track.track.name, "Final");
    assert_eq!(track.initial_state.len(), 1);
    assert!(!old_ids.contains(&track.initial_state[0].id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_nonexistent_returns_false(pool: PgPool) {
    let replaced = TrackRepo::replace(&pool, 999_999, &submission("Ghost", vec![marble(0.0)]))
        .await
        .unwrap();
    assert!(!replaced);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_body_insert_rolls_back_track(pool: PgPool) {
    let user_id = new_user(&pool, "loud").await;

    // Body volume outside 0..1 violates ck_bodies_volume.
    let result = TrackRepo::create(
        &pool,
        user_id,
        &submission("Too loud", vec![marble(0.0), note_block(Some(4.0))]),
    )
    .await;
    assert!(result.is_err());

    let tracks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tracks, 0, "track row should be rolled back");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_replace_keeps_previous_state(pool: PgPool) {
    let user_id = new_user(&pool, "careful").await;
    let track_id = TrackRepo::create(&pool, user_id, &submission("Stable", vec![marble(3.0)]))
        .await
        .unwrap();

    let result = TrackRepo::replace(
        &pool,
        track_id,
        &submission("Broken", vec![note_block(Some(-1.0))]),
    )
    .await;
    assert!(result.is_err());

    let track = TrackRepo::find_with_bodies(&pool, track_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(track.track.name, "Stable");
    assert_eq!(track.initial_state.len(), 1);
    assert_eq!(track.initial_state[0].body, marble(3.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_track_volume_check_constraint(pool: PgPool) {
    let user_id = new_user(&pool, "amp").await;
    let mut input = submission("Eleven", vec![]);
    input.volume = 11.0;

    let err = TrackRepo::create(&pool, user_id, &input).await.unwrap_err();
    let code = err.as_database_error().and_then(|e| e.code().map(|c| c.into_owned()));
    assert_matches!(code.as_deref(), Some("23514"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_removes_track_and_bodies(pool: PgPool) {
    let user_id = new_user(&pool, "cleaner").await;
    let track_id = TrackRepo::create(&pool, user_id, &submission("Gone", vec![marble(0.0)]))
        .await
        .unwrap();

    assert!(TrackRepo::delete(&pool, track_id).await.unwrap());
    assert!(TrackRepo::find_by_id(&pool, track_id).await.unwrap().is_none());
    assert_eq!(body_count(&pool, track_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_nonexistent_returns_false(pool: PgPool) {
    assert!(!TrackRepo::delete(&pool, 999_999).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_summaries_newest_first_with_limit(pool: PgPool) {
    let alice = new_user(&pool, "alice").await;
    let bob = new_user(&pool, "bob").await;
    for i in 0..3 {
        TrackRepo::create(&pool, alice, &submission(&format!("a{i}"), vec![]))
            .await
            .unwrap();
    }
    TrackRepo::create(&pool, bob, &submission("b0", vec![]))
        .await
        .unwrap();

    let summaries = TrackRepo::list_summaries(&pool, 2).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].name, "b0");
    assert_eq!(summaries[0].username, "bob");
    assert_eq!(summaries[1].name, "a2");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_summaries_scoped_to_user(pool: PgPool) {
    let alice = new_user(&pool, "alice").await;
    let bob = new_user(&pool, "bob").await;
    TrackRepo::create(&pool, alice, &submission("mine", vec![]))
        .await
        .unwrap();
    TrackRepo::create(&pool, bob, &submission("theirs", vec![]))
        .await
        .unwrap();

    let summaries = TrackRepo::list_summaries_for_user(&pool, alice).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "mine");
    assert_eq!(summaries[0].username, "alice");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_read_never_mixes_track_and_bodies_across_replace(pool: PgPool) {
    let user_id = new_user(&pool, "racer").await;
    let track_id = TrackRepo::create(&pool, user_id, &submission("v1", vec![marble(0.0)]))
        .await
        .unwrap();

    // Version n carries exactly n bodies.
    let writer = {
        let pool = pool.clone();
        tokio::spawn(async move {
            for n in 2..=30usize {
                let bodies = (0..n).map(|i| marble(i as f64)).collect();
                TrackRepo::replace(&pool, track_id, &submission(&format!("v{n}"), bodies))
                    .await
                    .unwrap();
            }
        })
    };

    while !writer.is_finished() {
        let track = TrackRepo::find_with_bodies(&pool, track_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(track.track.name, format!("v{}", track.initial_state.len()));
    }
    writer.await.unwrap();

    let track = TrackRepo::find_with_bodies(&pool, track_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(track.track.name, "v30");
    assert_eq!(track.initial_state.len(), 30);
}
