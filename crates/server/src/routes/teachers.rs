//! Routes for teaching staff.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    activity_log::{ActivityAction, ActivityModule},
    teacher::{CreateTeacher, Teacher, UpdateTeacher},
};
use utils::response::ApiResponse;

use super::{canonical_rut, require_field};
use crate::{AppState, error::ApiError};

const DUPLICATE_RUT: &str = "el RUT ya está registrado";

pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Teacher>>>, ApiError> {
    let teachers = Teacher::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(teachers)))
}

pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Teacher>>, ApiError> {
    let teacher = Teacher::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(teacher)))
}

pub async fn create_teacher(
    State(state): State<AppState>,
    ResponseJson(mut payload): ResponseJson<CreateTeacher>,
) -> Result<ResponseJson<ApiResponse<Teacher>>, ApiError> {
    require_field(&payload.first_name, "el nombre es obligatorio")?;
    require_field(&payload.last_name, "el apellido es obligatorio")?;

    payload.rut = canonical_rut(&payload.rut)?;
    if Teacher::rut_exists(&state.db.pool, &payload.rut).await? {
        return Err(ApiError::Duplicate(DUPLICATE_RUT.to_string()));
    }

    let teacher = Teacher::create(&state.db.pool, &payload).await?;
    state
        .activity
        .record(
            ActivityAction::Create,
            ActivityModule::Teachers,
            format!(
                "Profesor '{} {}' creado",
                teacher.first_name, teacher.last_name
            ),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(teacher)))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ResponseJson(mut payload): ResponseJson<UpdateTeacher>,
) -> Result<ResponseJson<ApiResponse<Teacher>>, ApiError> {
    let existing = Teacher::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(rut) = payload.rut.take() {
        let canonical = canonical_rut(&rut)?;
        if canonical != existing.rut && Teacher::rut_exists(&state.db.pool, &canonical).await? {
            return Err(ApiError::Duplicate(DUPLICATE_RUT.to_string()));
        }
        payload.rut = Some(canonical);
    }

    let teacher = Teacher::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    state
        .activity
        .record(
            ActivityAction::Update,
            ActivityModule::Teachers,
            format!(
                "Profesor '{} {}' actualizado",
                teacher.first_name, teacher.last_name
            ),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(teacher)))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Teacher::soft_delete(&state.db.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    state
        .activity
        .record(
            ActivityAction::Delete,
            ActivityModule::Teachers,
            format!("Profesor {id} eliminado"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/teachers",
        Router::new()
            .route("/", get(list_teachers).post(create_teacher))
            .route(
                "/{id}",
                get(get_teacher).put(update_teacher).delete(delete_teacher),
            ),
    )
}
