//! Routes for attendance records.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    activity_log::{ActivityAction, ActivityModule},
    attendance::{Attendance, AttendanceDetail, CreateAttendance, UpdateAttendance},
    student::Student,
    subject::Subject,
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn list_attendance(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<AttendanceDetail>>>, ApiError> {
    let records = Attendance::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(records)))
}

pub async fn create_attendance(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<CreateAttendance>,
) -> Result<ResponseJson<ApiResponse<Attendance>>, ApiError> {
    Student::find_by_id(&state.db.pool, payload.student_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Subject::find_by_id(&state.db.pool, payload.subject_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let record = Attendance::create(&state.db.pool, &payload).await?;
    state
        .activity
        .record(
            ActivityAction::Create,
            ActivityModule::Attendance,
            format!(
                "Asistencia '{}' registrada para el estudiante {}",
                record.status, record.student_id
            ),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(record)))
}

pub async fn update_attendance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ResponseJson(payload): ResponseJson<UpdateAttendance>,
) -> Result<ResponseJson<ApiResponse<Attendance>>, ApiError> {
    let record = Attendance::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    state
        .activity
        .record(
            ActivityAction::Update,
            ActivityModule::Attendance,
            format!("Registro de asistencia {id} actualizado"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(record)))
}

pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Attendance::delete(&state.db.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    state
        .activity
        .record(
            ActivityAction::Delete,
            ActivityModule::Attendance,
            format!("Registro de asistencia {id} eliminado"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/attendance",
        Router::new()
            .route("/", get(list_attendance).post(create_attendance))
            .route(
                "/{id}",
                axum::routing::put(update_attendance).delete(delete_attendance),
            ),
    )
}
