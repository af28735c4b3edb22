use std::sync::Arc;

use crate::{config::Config, repos::Repos, risk::RiskService, stores::CacheStore};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Database repositories.
    pub repos: Repos,
    /// Risk event cache (also probed by health checks).
    pub events: Arc<dyn CacheStore>,
    /// At-risk aggregation engine over `events`.
    pub risk: RiskService,
}
