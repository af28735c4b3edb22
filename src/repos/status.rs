//! Status repository for health checks.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

/// Repository for database health checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusRepo: Send + Sync {
    /// Health check - verify connectivity of both database pools.
    async fn health_check(&self) -> Result<bool>;
}

/// MySQL implementation of StatusRepo over both pools.
#[derive(Clone)]
pub struct MySqlStatusRepo {
    atrisk: Pool<MySql>,
    schools: Pool<MySql>,
}

impl MySqlStatusRepo {
    pub fn new(atrisk: Pool<MySql>, schools: Pool<MySql>) -> Self {
        Self { atrisk, schools }
    }
}

#[async_trait]
impl StatusRepo for MySqlStatusRepo {
    async fn health_check(&self) -> Result<bool> {
        let atrisk: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.atrisk).await?;
        let schools: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.schools)
            .await?;
        Ok(atrisk == 1 && schools == 1)
    }
}
