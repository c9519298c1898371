mod common;

use chrono::{TimeZone, Utc};
use sea_orm::ConnectionTrait;
use study_circle::migration::{Migrator, MigratorTrait};
use study_circle::services::sessions;

use common::connect;

const LEGACY_ROWS: &str = r#"
INSERT INTO study (id, name, join_code, created_at, created_by)
VALUES ('s1', 'Psalms', 'PSALMS', '2025-01-05T18:00:00+00:00', 'leader');

INSERT INTO study_session
    (id, study_id, title, sort_order, scheduled_at, starts_at, passage_reference, agenda, recap, created_at, updated_at)
VALUES
    ('only-starts', 's1', 'Session 1', 0, NULL, '2025-01-12T19:00:00+00:00', 'Psalm 1',
     '{"questions":[],"leaderNotes":""}', NULL, '2025-01-05T18:00:00+00:00', '2025-01-05T18:00:00+00:00'),
    ('both', 's1', 'Session 2', 1, '2025-01-19T19:30:00+00:00', '2025-01-19T19:00:00+00:00', 'Psalm 2',
     '{"questions":[],"leaderNotes":""}', NULL, '2025-01-05T18:00:00+00:00', '2025-01-05T18:00:00+00:00'),
    ('neither', 's1', NULL, NULL, NULL, NULL, '',
     '{"questions":[],"leaderNotes":""}', NULL, '2025-01-05T18:00:00+00:00', '2025-01-05T18:00:00+00:00');
"#;

#[tokio::test]
async fn legacy_start_times_are_backfilled() {
    let db = connect().await;
    Migrator::up(&db, Some(1)).await.unwrap();
    db.execute_unprepared(LEGACY_ROWS).await.unwrap();

    Migrator::up(&db, None).await.unwrap();
    assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());

    let only_starts = sessions::get_session(&db, "s1", "only-starts")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        only_starts.scheduled_at.map(|at| at.timestamp()),
        Some(Utc.with_ymd_and_hms(2025, 1, 12, 19, 0, 0).unwrap().timestamp())
    );

    // An existing scheduled time wins over the legacy one
    let both = sessions::get_session(&db, "s1", "both").await.unwrap().unwrap();
    assert_eq!(
        both.scheduled_at.map(|at| at.timestamp()),
        Some(Utc.with_ymd_and_hms(2025, 1, 19, 19, 30, 0).unwrap().timestamp())
    );

    let neither = sessions::get_session(&db, "s1", "neither").await.unwrap().unwrap();
    assert_eq!(neither.scheduled_at, None);
    assert_eq!(neither.order, None);
}

#[tokio::test]
async fn migrations_roll_back_cleanly() {
    let db = connect().await;
    Migrator::up(&db, None).await.unwrap();
    Migrator::down(&db, None).await.unwrap();

    assert_eq!(Migrator::get_pending_migrations(&db).await.unwrap().len(), 2);
    Migrator::up(&db, None).await.unwrap();
}
