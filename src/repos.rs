//! Database repositories (MySQL).
//!
//! This module contains traits and implementations for database access.
//! Each repository is abstracted behind a trait to enable mocking in tests.
//!
//! The schema pre-exists and is owned by other systems; these are read-only
//! passthrough queries against two databases:
//!
//! - the **at-risk** database (score rows),
//! - the **schools** database (student directory, customer settings).
//!
//! ## Usage in Handlers
//!
//! Repositories are accessed via `state.repos`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let rows = state.repos.scores.risk_scores(&email).await?;
//!     let info = state.repos.students.find(&email).await?;
//! }
//! ```

mod customers;
mod scores;
mod status;
mod students;

pub use customers::{CustomerRepo, MySqlCustomerRepo};
pub use scores::{MySqlScoreRepo, ScoreRepo};
pub use status::{MySqlStatusRepo, StatusRepo};
pub use students::{MySqlStudentRepo, StudentRepo};

#[cfg(test)]
pub use customers::MockCustomerRepo;
#[cfg(test)]
pub use scores::MockScoreRepo;
#[cfg(test)]
pub use status::MockStatusRepo;
#[cfg(test)]
pub use students::MockStudentRepo;

use std::sync::Arc;

/// Collection of all database repositories.
#[derive(Clone)]
pub struct Repos {
    pub scores: Arc<dyn ScoreRepo>,
    pub students: Arc<dyn StudentRepo>,
    pub customers: Arc<dyn CustomerRepo>,
    pub status: Arc<dyn StatusRepo>,
}
