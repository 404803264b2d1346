//! Audit-trail recording for mutating operations. A failed audit write is
//! logged and swallowed so it never fails the operation it describes.

use db::{
    DBService,
    models::activity_log::{ActivityAction, ActivityLog, ActivityModule, ActivitySeverity},
};
use tracing::warn;

#[derive(Clone)]
pub struct ActivityRecorder {
    db: DBService,
}

impl ActivityRecorder {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub async fn record(
        &self,
        action: ActivityAction,
        module: ActivityModule,
        description: impl Into<String>,
    ) {
        self.record_with(None, action, module, description, ActivitySeverity::Info)
            .await;
    }

    pub async fn record_with(
        &self,
        user_name: Option<&str>,
        action: ActivityAction,
        module: ActivityModule,
        description: impl Into<String>,
        severity: ActivitySeverity,
    ) {
        let description = description.into();
        if let Err(e) = ActivityLog::create(
            &self.db.pool,
            user_name,
            action,
            module,
            &description,
            severity,
        )
        .await
        {
            warn!(%action, %module, error = %e, "activity log write failed");
        }
    }
}
