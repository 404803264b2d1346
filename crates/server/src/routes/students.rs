//! Routes for students: CRUD, search and identifier pre-checks.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    activity_log::{ActivityAction, ActivityModule},
    grade::Grade,
    student::{CreateStudent, Student, UpdateStudent},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;

use super::{canonical_rut, require_field};
use crate::{AppState, error::ApiError};

const DUPLICATE_RUT: &str = "el RUT ya está registrado";

#[derive(Debug, Deserialize, TS)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct RutQuery {
    pub rut: String,
}

/// Result of the live identifier pre-check used by the student form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RutCheck {
    pub valid: bool,
    pub exists: bool,
    pub formatted: String,
}

pub async fn list_students(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Student>>>, ApiError> {
    let students = Student::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(students)))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Student>>, ApiError> {
    let student = Student::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(student)))
}

pub async fn search_students(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Student>>>, ApiError> {
    let students = Student::search(&state.db.pool, query.q.trim()).await?;
    Ok(ResponseJson(ApiResponse::success(students)))
}

/// Live identifier check: cleans and validates the input, and reports
/// whether the canonical form is already registered.
pub async fn check_rut(
    State(state): State<AppState>,
    Query(query): Query<RutQuery>,
) -> Result<ResponseJson<ApiResponse<RutCheck>>, ApiError> {
    let valid = utils::rut::validate(&query.rut);
    let formatted = utils::rut::format(&query.rut);
    let exists = if valid {
        Student::rut_exists(&state.db.pool, &formatted).await?
    } else {
        false
    };
    Ok(ResponseJson(ApiResponse::success(RutCheck {
        valid,
        exists,
        formatted,
    })))
}

pub async fn create_student(
    State(state): State<AppState>,
    ResponseJson(mut payload): ResponseJson<CreateStudent>,
) -> Result<ResponseJson<ApiResponse<Student>>, ApiError> {
    require_field(&payload.first_name, "el nombre es obligatorio")?;
    require_field(&payload.last_name, "el apellido es obligatorio")?;

    payload.rut = canonical_rut(&payload.rut)?;
    if Student::rut_exists(&state.db.pool, &payload.rut).await? {
        return Err(ApiError::Duplicate(DUPLICATE_RUT.to_string()));
    }

    let student = Student::create(&state.db.pool, &payload).await?;
    state
        .activity
        .record(
            ActivityAction::Create,
            ActivityModule::Students,
            format!(
                "Estudiante '{} {}' creado",
                student.first_name, student.last_name
            ),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ResponseJson(mut payload): ResponseJson<UpdateStudent>,
) -> Result<ResponseJson<ApiResponse<Student>>, ApiError> {
    require_field(&payload.first_name, "el nombre es obligatorio")?;
    require_field(&payload.last_name, "el apellido es obligatorio")?;

    let existing = Student::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    payload.rut = canonical_rut(&payload.rut)?;
    if payload.rut != existing.rut && Student::rut_exists(&state.db.pool, &payload.rut).await? {
        return Err(ApiError::Duplicate(DUPLICATE_RUT.to_string()));
    }

    let student = Student::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    state
        .activity
        .record(
            ActivityAction::Update,
            ActivityModule::Students,
            format!(
                "Estudiante '{} {}' actualizado",
                student.first_name, student.last_name
            ),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(student)))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Student::soft_delete(&state.db.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    state
        .activity
        .record(
            ActivityAction::Delete,
            ActivityModule::Students,
            format!("Estudiante {id} retirado"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn list_student_grades(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<db::models::grade::GradeDetail>>>, ApiError> {
    Student::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let grades = Grade::find_by_student_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(grades)))
}

pub async fn list_student_attendance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<db::models::attendance::AttendanceDetail>>>, ApiError> {
    Student::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let records =
        db::models::attendance::Attendance::find_by_student_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(records)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/students",
        Router::new()
            .route("/", get(list_students).post(create_student))
            .route("/search", get(search_students))
            .route("/rut-check", get(check_rut))
            .route(
                "/{id}",
                get(get_student).put(update_student).delete(delete_student),
            )
            .route("/{id}/grades", get(list_student_grades))
            .route("/{id}/attendance", get(list_student_attendance)),
    )
}
