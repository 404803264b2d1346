pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use db::DBService;
use services::services::{
    activity::ActivityRecorder,
    config::Config,
    dashboard::DashboardService,
    repository::SqliteRepository,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub config: Config,
    pub activity: ActivityRecorder,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub fn new(db: DBService, config: Config) -> Self {
        let repository = Arc::new(SqliteRepository::new(db.clone()));
        Self {
            activity: ActivityRecorder::new(db.clone()),
            dashboard: Arc::new(DashboardService::new(repository)),
            db,
            config,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::schools::router())
        .merge(routes::teachers::router())
        .merge(routes::courses::router())
        .merge(routes::students::router())
        .merge(routes::subjects::router())
        .merge(routes::grades::router())
        .merge(routes::attendance::router())
        .merge(routes::dashboard::router())
        .merge(routes::activity::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
