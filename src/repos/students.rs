//! Student directory lookups from MySQL.
//!
//! Google-managed schools live in `usermap`, Azure-managed schools in
//! `azureUsers`; a lookup unions both.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

use crate::models::StudentInfo;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepo: Send + Sync {
    /// Directory entry for a student by email alone.
    async fn find(&self, email: &str) -> Result<Option<StudentInfo>>;

    /// Directory entry scoped to a customer domain (fid).
    async fn find_with_fid(&self, fid: &str, email: &str) -> Result<Option<StudentInfo>>;
}

/// MySQL implementation of StudentRepo.
#[derive(Clone)]
pub struct MySqlStudentRepo {
    pool: Pool<MySql>,
}

impl MySqlStudentRepo {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepo for MySqlStudentRepo {
    async fn find(&self, email: &str) -> Result<Option<StudentInfo>> {
        let info = sqlx::query_as::<_, StudentInfo>(
            "SELECT givenName, familyName FROM usermap WHERE userEmail = ? \
             UNION SELECT givenName, familyName FROM azureUsers WHERE userEmail = ?",
        )
        .bind(email)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(info)
    }

    async fn find_with_fid(&self, fid: &str, email: &str) -> Result<Option<StudentInfo>> {
        let info = sqlx::query_as::<_, StudentInfo>(
            "SELECT givenName, familyName FROM usermap WHERE email = ? AND userEmail = ? \
             UNION SELECT givenName, familyName FROM azureUsers WHERE fid = ? AND userEmail = ?",
        )
        .bind(fid)
        .bind(email)
        .bind(fid)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(info)
    }
}
