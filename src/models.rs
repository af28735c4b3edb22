use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the DB-sourced at-risk score table. The score column is kept
/// opaque (stringly-typed in the schema); this read path never interprets it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScoreRow {
    pub user_email: String,
    pub self_harm_score: String,
}

/// Directory entry for a student, sourced from the usermap/azureUsers union.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    #[sqlx(rename = "givenName")]
    pub given_name: String,
    #[sqlx(rename = "familyName")]
    pub family_name: String,
}

/// Aware email notification settings for a customer domain.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i32,
    pub fid: String,
    #[sqlx(rename = "notifEmail")]
    pub notification_email: String,
    pub basegen: i32,
}

/// The subset of a customer's filter settings the filter-type decision reads.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    pub id: i32,
    pub user_id: i32,
    #[sqlx(rename = "schoolType")]
    pub school_type: i32,
    pub ad_intranet: Vec<u8>,
}
