use std::sync::Arc;

use sqlx::SqlitePool;

use crate::host::HostGateway;
use crate::monitor::MembershipMonitor;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub host: Arc<dyn HostGateway>,
    pub monitor: MembershipMonitor,
    pub space_id: String,
}
