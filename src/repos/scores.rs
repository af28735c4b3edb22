//! At-risk score rows from MySQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

use crate::models::RiskScoreRow;

/// Repository for the DB-sourced at-risk score read path. This sits beside
/// the cache-derived totals and is never folded into them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreRepo: Send + Sync {
    /// All score rows recorded for an email.
    async fn risk_scores(&self, email: &str) -> Result<Vec<RiskScoreRow>>;
}

/// MySQL implementation of ScoreRepo.
#[derive(Clone)]
pub struct MySqlScoreRepo {
    pool: Pool<MySql>,
}

impl MySqlScoreRepo {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreRepo for MySqlScoreRepo {
    async fn risk_scores(&self, email: &str) -> Result<Vec<RiskScoreRow>> {
        let rows = sqlx::query_as::<_, RiskScoreRow>(
            "SELECT user_email, self_harm_score FROM AtRiskScore WHERE user_email = ?",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
