pub mod activity;
pub mod attendance;
pub mod courses;
pub mod dashboard;
pub mod grades;
pub mod schools;
pub mod students;
pub mod subjects;
pub mod teachers;

use crate::error::ApiError;

/// Validates a raw identifier and returns its canonical formatted form.
/// Both storage and duplicate lookups go through this, which makes the
/// duplicate check insensitive to case and separator differences.
pub(crate) fn canonical_rut(raw: &str) -> Result<String, ApiError> {
    if !utils::rut::validate(raw) {
        return Err(ApiError::Validation("el RUT ingresado no es válido".to_string()));
    }
    Ok(utils::rut::format(raw))
}

pub(crate) fn require_field(value: &str, message: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(())
}
