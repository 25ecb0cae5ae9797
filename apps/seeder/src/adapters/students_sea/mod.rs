//! SeaORM adapter for the students table.

use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait, Set};

use crate::entities::students;

pub mod dto;

pub use dto::StudentCreate;

// Adapter functions return DbErr; the repos layer maps to AppError.

pub async fn create_student<C: ConnectionTrait>(
    conn: &C,
    dto: StudentCreate,
) -> Result<students::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let student_active = students::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        age: Set(dto.age),
        class: Set(dto.class),
        created_at: Set(now),
        updated_at: Set(now),
    };

    student_active.insert(conn).await
}

pub async fn find_student_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<students::Model>, sea_orm::DbErr> {
    students::Entity::find_by_id(id).one(conn).await
}

pub async fn count_students<C: ConnectionTrait>(conn: &C) -> Result<u64, sea_orm::DbErr> {
    students::Entity::find().count(conn).await
}
