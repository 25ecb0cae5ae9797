//! Record creator behavior on an in-memory SQLite database.

use db_infra::config::db::DbSettings;
use sea_orm::{ActiveModelTrait, NotSet, Set};
use student_seed::entities::students;
use student_seed::infra::db_errors::map_db_err;
use student_seed::repos::students as students_repo;
use student_seed::{sync_schema, AppError, Connection, StudentCreate};
use test_support::unique_student_name;
use time::OffsetDateTime;

async fn synced_memory_db() -> Connection {
    test_support::logging::init();
    let conn = Connection::open(&DbSettings::sqlite_memory())
        .await
        .expect("open sqlite memory db");
    sync_schema(&conn).await.expect("sync schema");
    conn
}

#[tokio::test]
async fn test_create_without_class_stores_null() -> Result<(), AppError> {
    let mut conn = synced_memory_db().await;
    let name = unique_student_name("Jane");

    let created = students_repo::create_student(conn.db()?, StudentCreate::new(&name, 19)).await?;

    assert_eq!(created.name, name);
    assert_eq!(created.class, None);
    let found = students_repo::find_student_by_id(conn.db()?, created.id).await?;
    assert_eq!(found.and_then(|s| s.class), None);

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_blank_name_is_rejected_before_insert() -> Result<(), AppError> {
    let mut conn = synced_memory_db().await;

    let err = students_repo::create_student(conn.db()?, StudentCreate::new("   ", 20))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(students_repo::count_students(conn.db()?).await?, 0);

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_missing_name_fails_not_null() -> Result<(), AppError> {
    let mut conn = synced_memory_db().await;
    let now = OffsetDateTime::now_utc();

    let err = students::ActiveModel {
        id: NotSet,
        name: NotSet,
        age: Set(20),
        class: Set(Some("Physics".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn.db()?)
    .await
    .unwrap_err();

    assert!(matches!(map_db_err(err), AppError::Validation { .. }));
    assert_eq!(students_repo::count_students(conn.db()?).await?, 0);

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_missing_age_fails_not_null() -> Result<(), AppError> {
    let mut conn = synced_memory_db().await;
    let now = OffsetDateTime::now_utc();

    let err = students::ActiveModel {
        id: NotSet,
        name: Set("John Doe".to_string()),
        age: NotSet,
        class: NotSet,
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn.db()?)
    .await
    .unwrap_err();

    assert!(matches!(map_db_err(err), AppError::Validation { .. }));

    conn.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_create_after_close_fails() -> Result<(), AppError> {
    let mut conn = synced_memory_db().await;
    conn.close().await?;

    let err = conn.db().unwrap_err();
    assert!(matches!(err, AppError::Connection { .. }));
    Ok(())
}

#[tokio::test]
async fn test_created_row_serializes_for_logging() -> Result<(), AppError> {
    let mut conn = synced_memory_db().await;

    let created = students_repo::create_student(conn.db()?, StudentCreate::john_doe()).await?;
    let json: serde_json::Value = serde_json::to_value(&created).expect("serialize student");

    assert_eq!(json["name"], "John Doe");
    assert_eq!(json["age"], 20);
    assert_eq!(json["class"], "Physics");
    assert!(json["created_at"].is_string());

    conn.close().await?;
    Ok(())
}
