//! Coordinator for the establishment -> course -> roster drill-down.
//!
//! One node per level may be selected at a time. Selecting a new upstream
//! node clears every downstream selection before its scoped fetch is issued,
//! and every fetch carries the epoch of the selection that issued it: a
//! result whose epoch no longer matches the current selection is discarded
//! instead of overwriting newer state.

use std::sync::Arc;

use db::models::{course::CourseDetail, school::School, student::Student};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::repository::DirectoryRepository;

const COURSES_FETCH_FAILED: &str =
    "No se pudieron cargar los cursos. Por favor, intente nuevamente.";
const ROSTER_FETCH_FAILED: &str =
    "No se pudieron cargar los estudiantes del curso. Por favor, intente nuevamente.";
const SCHOOLS_FETCH_FAILED: &str =
    "No se pudieron cargar los establecimientos. Por favor, intente nuevamente.";

/// Snapshot of the drill-down state.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub establishments: Vec<School>,
    pub selected_school: Option<School>,
    pub courses: Vec<CourseDetail>,
    pub selected_course: Option<CourseDetail>,
    pub roster: Vec<Student>,
    /// User-visible message for the last failed fetch, if any.
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    state: SelectionState,
    course_epoch: Uuid,
    roster_epoch: Uuid,
}

pub struct SelectionCoordinator {
    repo: Arc<dyn DirectoryRepository>,
    inner: RwLock<Inner>,
}

impl SelectionCoordinator {
    pub fn new(repo: Arc<dyn DirectoryRepository>) -> Self {
        Self {
            repo,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub async fn state(&self) -> SelectionState {
        self.inner.read().await.state.clone()
    }

    /// Loads the top-level collection. A single-entry result auto-selects
    /// that establishment.
    pub async fn load_establishments(&self) -> SelectionState {
        match self.repo.establishments().await {
            Ok(establishments) => {
                let single = (establishments.len() == 1).then(|| establishments[0].clone());
                {
                    let mut inner = self.inner.write().await;
                    inner.state.establishments = establishments;
                    inner.state.error = None;
                }
                if let Some(school) = single {
                    debug!(school_id = school.id, "single establishment, auto-selecting");
                    self.select_school(Some(school)).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "establishment fetch failed");
                let mut inner = self.inner.write().await;
                inner.state.error = Some(SCHOOLS_FETCH_FAILED.to_string());
            }
        }
        self.state().await
    }

    /// Changes the establishment selection. Course selection and roster are
    /// cleared before the scoped course fetch is issued; `None` only clears.
    pub async fn select_school(&self, school: Option<School>) -> SelectionState {
        let epoch = {
            let mut inner = self.inner.write().await;
            inner.state.selected_school = school.clone();
            inner.state.selected_course = None;
            inner.state.courses.clear();
            inner.state.roster.clear();
            inner.state.error = None;
            inner.course_epoch = Uuid::new_v4();
            inner.roster_epoch = Uuid::new_v4();
            inner.course_epoch
        };

        if let Some(school) = school {
            self.fetch_courses(school.id, epoch).await;
        }
        self.state().await
    }

    /// Changes the course selection. The roster is cleared before the scoped
    /// fetch is issued; `None` only clears.
    pub async fn select_course(&self, course: Option<CourseDetail>) -> SelectionState {
        let epoch = {
            let mut inner = self.inner.write().await;
            inner.state.selected_course = course.clone();
            inner.state.roster.clear();
            inner.state.error = None;
            inner.roster_epoch = Uuid::new_v4();
            inner.roster_epoch
        };

        if let Some(course) = course {
            self.fetch_roster(course.id, epoch).await;
        }
        self.state().await
    }

    /// Re-issues the fetch for the deepest current selection. Retries are
    /// always user-initiated.
    pub async fn retry(&self) -> SelectionState {
        let (school, course, course_epoch, roster_epoch) = {
            let mut inner = self.inner.write().await;
            inner.state.error = None;
            (
                inner.state.selected_school.clone(),
                inner.state.selected_course.clone(),
                inner.course_epoch,
                inner.roster_epoch,
            )
        };

        match (school, course) {
            (_, Some(course)) => self.fetch_roster(course.id, roster_epoch).await,
            (Some(school), None) => self.fetch_courses(school.id, course_epoch).await,
            (None, None) => {
                return self.load_establishments().await;
            }
        }
        self.state().await
    }

    async fn fetch_courses(&self, school_id: i64, epoch: Uuid) {
        debug!(school_id, "loading courses");
        let result = self.repo.courses_for_establishment(school_id).await;

        let mut inner = self.inner.write().await;
        if inner.course_epoch != epoch {
            debug!(school_id, "discarding stale course fetch");
            return;
        }
        match result {
            Ok(courses) => inner.state.courses = courses,
            Err(e) => {
                warn!(school_id, error = %e, "course fetch failed");
                inner.state.error = Some(COURSES_FETCH_FAILED.to_string());
            }
        }
    }

    async fn fetch_roster(&self, course_id: i64, epoch: Uuid) {
        debug!(course_id, "loading roster");
        let result = self.repo.roster_for_course(course_id).await;

        let mut inner = self.inner.write().await;
        if inner.roster_epoch != epoch {
            debug!(course_id, "discarding stale roster fetch");
            return;
        }
        match result {
            Ok(roster) => inner.state.roster = roster,
            Err(e) => {
                warn!(course_id, error = %e, "roster fetch failed");
                inner.state.error = Some(ROSTER_FETCH_FAILED.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicBool, Ordering},
    };

    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use db::models::student::StudentStatus;
    use tokio::sync::Notify;

    use super::*;
    use crate::services::repository::RepositoryError;

    fn school(id: i64, name: &str) -> School {
        let now = Utc::now();
        School {
            id,
            name: name.to_string(),
            address: None,
            city: None,
            phone: None,
            email: None,
            website: None,
            director_name: None,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn course(id: i64, school_id: i64, name: &str) -> CourseDetail {
        let now = Utc::now();
        CourseDetail {
            id,
            name: name.to_string(),
            year: 2024,
            level: "A".to_string(),
            teacher_id: None,
            school_id,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            teacher_name: None,
            school_name: None,
        }
    }

    fn student(id: i64, course_id: i64, last_name: &str) -> Student {
        let now = Utc::now();
        Student {
            id,
            rut: format!("{}-5", 12_345_670 + id),
            first_name: "Ana".to_string(),
            last_name: last_name.to_string(),
            birth_date: NaiveDate::from_ymd_opt(2012, 3, 1).unwrap(),
            gender: "F".to_string(),
            address: None,
            phone: None,
            email: None,
            status: StudentStatus::Active,
            course_id: Some(course_id),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[derive(Default)]
    struct FakeRepo {
        schools: Vec<School>,
        courses: HashMap<i64, Vec<CourseDetail>>,
        rosters: HashMap<i64, Vec<Student>>,
        fail_courses_once: AtomicBool,
        /// When set, course fetches for this school park until released.
        gated_school: Option<i64>,
        gate_entered: Notify,
        gate_release: Notify,
    }

    #[async_trait]
    impl DirectoryRepository for FakeRepo {
        async fn establishments(&self) -> Result<Vec<School>, RepositoryError> {
            Ok(self.schools.clone())
        }

        async fn courses_for_establishment(
            &self,
            school_id: i64,
        ) -> Result<Vec<CourseDetail>, RepositoryError> {
            if self.fail_courses_once.swap(false, Ordering::SeqCst) {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            if self.gated_school == Some(school_id) {
                self.gate_entered.notify_one();
                self.gate_release.notified().await;
            }
            Ok(self.courses.get(&school_id).cloned().unwrap_or_default())
        }

        async fn roster_for_course(
            &self,
            course_id: i64,
        ) -> Result<Vec<Student>, RepositoryError> {
            Ok(self.rosters.get(&course_id).cloned().unwrap_or_default())
        }
    }

    fn two_school_repo() -> FakeRepo {
        FakeRepo {
            schools: vec![school(1, "Norte"), school(2, "Sur")],
            courses: HashMap::from([
                (1, vec![course(10, 1, "1°"), course(11, 1, "2°")]),
                (2, vec![course(20, 2, "1°")]),
            ]),
            rosters: HashMap::from([
                (10, vec![student(100, 10, "Pérez"), student(101, 10, "Soto")]),
                (20, vec![student(200, 20, "Rojas")]),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn reselecting_school_resets_course_and_roster() {
        let coordinator = SelectionCoordinator::new(Arc::new(two_school_repo()));

        coordinator.select_school(Some(school(1, "Norte"))).await;
        let state = coordinator.select_course(Some(course(10, 1, "1°"))).await;
        assert_eq!(state.roster.len(), 2);

        let state = coordinator.select_school(Some(school(2, "Sur"))).await;
        assert!(state.selected_course.is_none());
        assert!(state.roster.is_empty());
        assert_eq!(state.courses.len(), 1);
        assert_eq!(state.courses[0].school_id, 2);
    }

    #[tokio::test]
    async fn deselecting_cascades_downstream_clearing() {
        let coordinator = SelectionCoordinator::new(Arc::new(two_school_repo()));

        coordinator.select_school(Some(school(1, "Norte"))).await;
        coordinator.select_course(Some(course(10, 1, "1°"))).await;

        let state = coordinator.select_course(None).await;
        assert!(state.roster.is_empty());
        assert!(state.selected_course.is_none());

        let state = coordinator.select_school(None).await;
        assert!(state.courses.is_empty());
        assert!(state.selected_school.is_none());
    }

    #[tokio::test]
    async fn single_establishment_is_auto_selected() {
        let repo = FakeRepo {
            schools: vec![school(1, "Norte")],
            courses: HashMap::from([(1, vec![course(10, 1, "1°")])]),
            ..Default::default()
        };
        let coordinator = SelectionCoordinator::new(Arc::new(repo));

        let state = coordinator.load_establishments().await;
        assert_eq!(
            state.selected_school.as_ref().map(|s| s.id),
            Some(1),
            "single entry must be selected automatically"
        );
        assert_eq!(state.courses.len(), 1);
    }

    #[tokio::test]
    async fn multiple_establishments_are_not_auto_selected() {
        let coordinator = SelectionCoordinator::new(Arc::new(two_school_repo()));

        let state = coordinator.load_establishments().await;
        assert_eq!(state.establishments.len(), 2);
        assert!(state.selected_school.is_none());
    }

    #[tokio::test]
    async fn stale_course_fetch_is_discarded() {
        let repo = Arc::new(FakeRepo {
            gated_school: Some(1),
            ..two_school_repo()
        });
        let coordinator = Arc::new(SelectionCoordinator::new(repo.clone()));

        // First selection parks inside the repository fetch.
        let slow = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.select_school(Some(school(1, "Norte"))).await })
        };
        repo.gate_entered.notified().await;

        // Second selection completes while the first is still in flight.
        coordinator.select_school(Some(school(2, "Sur"))).await;

        // Releasing the first fetch must not overwrite the newer selection.
        repo.gate_release.notify_one();
        slow.await.unwrap();

        let state = coordinator.state().await;
        assert_eq!(state.selected_school.as_ref().map(|s| s.id), Some(2));
        assert_eq!(state.courses.len(), 1);
        assert_eq!(state.courses[0].school_id, 2);
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_message_and_retry_recovers() {
        let repo = two_school_repo();
        repo.fail_courses_once.store(true, Ordering::SeqCst);
        let coordinator = SelectionCoordinator::new(Arc::new(repo));

        let state = coordinator.select_school(Some(school(1, "Norte"))).await;
        assert!(state.error.is_some());
        assert!(state.courses.is_empty());
        // Selection survives the failure.
        assert_eq!(state.selected_school.as_ref().map(|s| s.id), Some(1));

        let state = coordinator.retry().await;
        assert!(state.error.is_none());
        assert_eq!(state.courses.len(), 2);
    }
}
