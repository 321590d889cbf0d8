use uuid::Uuid;

use crate::db::ProjectStore;

/// Log an audit event. Failures are logged and swallowed so they never fail the caller.
pub async fn log_event(
    store: &dyn ProjectStore,
    user_id: Option<Uuid>,
    action: &str,
    resource_type: &str,
    resource_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) {
    if let Err(e) = store
        .log_event(user_id, action, resource_type, resource_id, details)
        .await
    {
        tracing::error!("Failed to log audit event {action}: {e}");
    }
}
