#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use study_circle::identity::Uid;
use study_circle::migration::{Migrator, MigratorTrait};

/// Fresh in-memory database with every migration applied.
///
/// The pool holds a single connection so the in-memory database outlives
/// individual queries.
pub async fn test_db() -> DatabaseConnection {
    let db = connect().await;
    Migrator::up(&db, None).await.unwrap();
    db
}

/// In-memory database with no migrations applied.
pub async fn connect() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(opt).await.unwrap()
}

pub fn uid(name: &str) -> Uid {
    Uid::new(name)
}
