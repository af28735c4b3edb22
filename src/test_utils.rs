//! Shared test utilities for API handler tests.
//!
//! Provides a test configuration and a flexible `TestStateBuilder` for
//! constructing `AppState` instances with only the mocks needed for each
//! test. The risk engine is always real; tests shape its behavior through
//! the mocked cache store underneath it.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::TestStateBuilder;
//!
//! let mut cache = MockCacheStore::new();
//! cache.expect_exists().returning(|_| Ok(true));
//!
//! let state = TestStateBuilder::new().with_cache(cache).build();
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::repos::{MockCustomerRepo, MockScoreRepo, MockStatusRepo, MockStudentRepo, Repos};
use crate::risk::RiskService;
use crate::state::AppState;
use crate::stores::{CacheStore, MockCacheStore};

/// Creates a test configuration with dummy values.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        atrisk_database_url: "mysql://test".to_string(),
        schools_database_url: "mysql://test".to_string(),
        redis_url: "redis://test".to_string(),
        default_event_ttl_secs: 5_184_000,
        env: "test".to_string(),
        sentry_dsn: None,
    }
}

/// Builder for constructing test `AppState` with custom mocks.
///
/// Uses default (empty) mocks for any repo/store not explicitly set.
/// This allows tests to only configure the mocks they actually need.
pub struct TestStateBuilder {
    score_repo: Option<MockScoreRepo>,
    student_repo: Option<MockStudentRepo>,
    customer_repo: Option<MockCustomerRepo>,
    status_repo: Option<MockStatusRepo>,
    cache: Option<MockCacheStore>,
}

impl TestStateBuilder {
    /// Creates a new builder with no mocks configured.
    pub fn new() -> Self {
        Self {
            score_repo: None,
            student_repo: None,
            customer_repo: None,
            status_repo: None,
            cache: None,
        }
    }

    pub fn with_score_repo(mut self, repo: MockScoreRepo) -> Self {
        self.score_repo = Some(repo);
        self
    }

    pub fn with_student_repo(mut self, repo: MockStudentRepo) -> Self {
        self.student_repo = Some(repo);
        self
    }

    pub fn with_customer_repo(mut self, repo: MockCustomerRepo) -> Self {
        self.customer_repo = Some(repo);
        self
    }

    pub fn with_status_repo(mut self, repo: MockStatusRepo) -> Self {
        self.status_repo = Some(repo);
        self
    }

    pub fn with_cache(mut self, cache: MockCacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builds the `AppState` using configured mocks or defaults.
    pub fn build(self) -> AppState {
        let config = test_config();

        let repos = Repos {
            scores: Arc::new(self.score_repo.unwrap_or_else(MockScoreRepo::new)),
            students: Arc::new(self.student_repo.unwrap_or_else(MockStudentRepo::new)),
            customers: Arc::new(self.customer_repo.unwrap_or_else(MockCustomerRepo::new)),
            status: Arc::new(self.status_repo.unwrap_or_else(MockStatusRepo::new)),
        };

        let events: Arc<dyn CacheStore> =
            Arc::new(self.cache.unwrap_or_else(MockCacheStore::new));
        let risk = RiskService::new(events.clone(), config.default_event_ttl_secs);

        AppState {
            config,
            repos,
            events,
            risk,
        }
    }
}
