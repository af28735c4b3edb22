//! Customer settings lookups from MySQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

use crate::models::{FilterSettings, Notification};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepo: Send + Sync {
    /// IANA timezone name configured for a user, if any.
    async fn timezone(&self, email: &str) -> Result<Option<String>>;

    /// Aware email notification settings for a customer domain.
    async fn aware_notification(&self, fid: &str) -> Result<Option<Notification>>;

    /// Filter settings row for the customer owning an email.
    async fn filter_settings(&self, email: &str) -> Result<Option<FilterSettings>>;
}

/// MySQL implementation of CustomerRepo.
#[derive(Clone)]
pub struct MySqlCustomerRepo {
    pool: Pool<MySql>,
}

impl MySqlCustomerRepo {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepo for MySqlCustomerRepo {
    async fn timezone(&self, email: &str) -> Result<Option<String>> {
        let tz = sqlx::query_scalar::<_, String>("SELECT timezone FROM user WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tz)
    }

    async fn aware_notification(&self, fid: &str) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "SELECT id, fid, notifEmail, basegen FROM awareEmailNotification WHERE fid = ?",
        )
        .bind(fid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(notification)
    }

    async fn filter_settings(&self, email: &str) -> Result<Option<FilterSettings>> {
        let settings = sqlx::query_as::<_, FilterSettings>(
            "SELECT s.id, s.user_id, s.schoolType, s.ad_intranet FROM setting AS s \
             LEFT JOIN user AS u ON s.user_id = u.userId WHERE u.email = ? LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings)
    }
}
