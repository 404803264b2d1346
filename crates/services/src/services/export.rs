//! Roster CSV exports, compatible with common spreadsheet tools.

use db::models::{
    course::Course,
    student::{Student, StudentStatus},
};
use thiserror::Error;
use tracing::debug;
use utils::csv::{CSV_MIME_TYPE, CsvWriter};

/// Column order for a single-course export.
pub const COURSE_EXPORT_HEADERS: [&str; 9] = [
    "RUT",
    "Nombre",
    "Apellido",
    "Fecha de Nacimiento",
    "Género",
    "Email",
    "Teléfono",
    "Dirección",
    "Estado",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("el curso no tiene estudiantes para exportar")]
    EmptyRoster,
    #[error("no hay estudiantes para exportar en ningún curso")]
    NothingToExport,
}

/// A generated CSV download.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Serializes one course roster. Filename pattern:
/// `"{School} - {Course}{Level} ({Year}).csv"`.
pub fn export_course(
    school_name: &str,
    course: &Course,
    roster: &[Student],
) -> Result<CsvExport, ExportError> {
    if roster.is_empty() {
        return Err(ExportError::EmptyRoster);
    }

    let mut writer = CsvWriter::new(&COURSE_EXPORT_HEADERS);
    for student in roster {
        push_student_row(&mut writer, None, student);
    }

    debug!(course_id = course.id, rows = roster.len(), "course exported");
    Ok(CsvExport {
        filename: format!(
            "{} - {}{} ({}).csv",
            school_name, course.name, course.level, course.year
        ),
        mime_type: CSV_MIME_TYPE,
        content: writer.finish(),
    })
}

/// Serializes every course of an establishment into a single document with a
/// group-identifying `Curso` column. Courses without students are skipped;
/// an export with no students at all is an error. Filename pattern:
/// `"{School} - Todos los cursos.csv"`.
pub fn export_all_courses(
    school_name: &str,
    groups: &[(Course, Vec<Student>)],
) -> Result<CsvExport, ExportError> {
    if groups.iter().all(|(_, roster)| roster.is_empty()) {
        return Err(ExportError::NothingToExport);
    }

    let headers: Vec<&str> = std::iter::once("Curso")
        .chain(COURSE_EXPORT_HEADERS)
        .collect();
    let mut writer = CsvWriter::new(&headers);

    for (course, roster) in groups {
        let group = course.label();
        for student in roster {
            push_student_row(&mut writer, Some(&group), student);
        }
    }

    Ok(CsvExport {
        filename: format!("{school_name} - Todos los cursos.csv"),
        mime_type: CSV_MIME_TYPE,
        content: writer.finish(),
    })
}

fn push_student_row(writer: &mut CsvWriter, group: Option<&str>, student: &Student) {
    let birth_date = student.birth_date.to_string();
    let fields = [
        Some(student.rut.as_str()),
        Some(student.first_name.as_str()),
        Some(student.last_name.as_str()),
        Some(birth_date.as_str()),
        Some(gender_label(&student.gender)),
        student.email.as_deref(),
        student.phone.as_deref(),
        student.address.as_deref(),
        Some(status_label(student.status)),
    ];
    match group {
        Some(group) => writer.row(std::iter::once(Some(group)).chain(fields)),
        None => writer.row(fields),
    }
}

fn gender_label(gender: &str) -> &'static str {
    match gender {
        "M" => "Masculino",
        "F" => "Femenino",
        _ => "Otro",
    }
}

fn status_label(status: StudentStatus) -> &'static str {
    match status {
        StudentStatus::Active => "Activo",
        StudentStatus::Graduated => "Egresado",
        StudentStatus::Withdrawn => "Retirado",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use utils::csv::UTF8_BOM;

    use super::*;

    fn course(name: &str, level: &str, year: i32) -> Course {
        let now = Utc::now();
        Course {
            id: 1,
            name: name.to_string(),
            year,
            level: level.to_string(),
            teacher_id: None,
            school_id: 1,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn student(last_name: &str, phone: Option<&str>) -> Student {
        let now = Utc::now();
        Student {
            id: 1,
            rut: "12.345.678-5".to_string(),
            first_name: "Ana".to_string(),
            last_name: last_name.to_string(),
            birth_date: NaiveDate::from_ymd_opt(2011, 7, 15).unwrap(),
            gender: "F".to_string(),
            address: None,
            phone: phone.map(str::to_string),
            email: None,
            status: db::models::student::StudentStatus::Active,
            course_id: Some(1),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn course_export_uses_expected_filename() {
        let export = export_course(
            "Colegio Norte",
            &course("1°", "A", 2024),
            &[student("Pérez", None)],
        )
        .unwrap();
        assert_eq!(export.filename, "Colegio Norte - 1°A (2024).csv");
        assert_eq!(export.mime_type, "text/csv;charset=utf-8");
    }

    #[test]
    fn export_escapes_commas_and_leaves_null_fields_empty() {
        let export = export_course(
            "Colegio Norte",
            &course("1°", "A", 2024),
            &[student("O'Brien, Jr.", None)],
        )
        .unwrap();

        let body = export.content.strip_prefix(UTF8_BOM).unwrap();
        let mut lines = body.lines();
        assert_eq!(
            lines.next().unwrap(),
            "RUT,Nombre,Apellido,Fecha de Nacimiento,Género,Email,Teléfono,Dirección,Estado"
        );
        assert_eq!(
            lines.next().unwrap(),
            "12.345.678-5,Ana,\"O'Brien, Jr.\",2011-07-15,Femenino,,,,Activo"
        );
    }

    #[test]
    fn empty_roster_is_rejected() {
        let err = export_course("Colegio Norte", &course("1°", "A", 2024), &[]).unwrap_err();
        assert!(matches!(err, ExportError::EmptyRoster));
    }

    #[test]
    fn all_courses_export_prepends_group_column() {
        let groups = vec![
            (course("1°", "A", 2024), vec![student("Pérez", Some("+56 9 1111"))]),
            (course("2°", "B", 2024), vec![]),
            (course("3°", "C", 2024), vec![student("Soto", None)]),
        ];
        let export = export_all_courses("Colegio Norte", &groups).unwrap();

        assert_eq!(export.filename, "Colegio Norte - Todos los cursos.csv");
        let body = export.content.strip_prefix(UTF8_BOM).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(
            lines[0],
            "Curso,RUT,Nombre,Apellido,Fecha de Nacimiento,Género,Email,Teléfono,Dirección,Estado"
        );
        assert!(lines[1].starts_with("1° A (2024),"));
        // The student-less course contributes no rows.
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("3° C (2024),"));
    }

    #[test]
    fn all_courses_with_no_students_is_rejected() {
        let groups = vec![(course("1°", "A", 2024), vec![])];
        let err = export_all_courses("Colegio Norte", &groups).unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
    }
}
