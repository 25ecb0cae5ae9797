//! Student repository: validation plus error mapping over the SeaORM adapter.

use sea_orm::ConnectionTrait;

use crate::adapters::students_sea::{self as students_adapter, StudentCreate};
use crate::entities::Student;
use crate::error::AppError;

/// Insert one student and return it with its generated id.
pub async fn create_student<C: ConnectionTrait>(
    conn: &C,
    dto: StudentCreate,
) -> Result<Student, AppError> {
    if dto.name.trim().is_empty() {
        return Err(AppError::validation("name is required"));
    }

    Ok(students_adapter::create_student(conn, dto).await?)
}

pub async fn find_student_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<Student>, AppError> {
    Ok(students_adapter::find_student_by_id(conn, id).await?)
}

pub async fn count_students<C: ConnectionTrait>(conn: &C) -> Result<u64, AppError> {
    Ok(students_adapter::count_students(conn).await?)
}
