//! Customer settings endpoints.
//!
//! Thin read paths over the schools database, keyed by `fid` (the
//! customer-scoped identifier, itself an email address).
//!
//! ## Endpoints
//!
//! - GET /customer/timezone - configured IANA zone plus its current abbreviation
//! - GET /customer/notification/config/aware - aware notification settings
//! - GET /customer/filter-type - whether the customer filters by security group or OU

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use chrono_tz::Tz;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

/// schoolType column value for Azure-managed tenants.
const SCHOOL_TYPE_AZURE: i32 = 2;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/timezone", get(timezone))
        .route("/notification/config/aware", get(notification))
        .route("/filter-type", get(filter_type))
}

#[derive(Debug, Deserialize, Validate)]
struct FidQuery {
    #[garde(email)]
    fid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimezoneResponse {
    tz: String,
    tz_abbr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterTypeResponse {
    filter_type: &'static str,
}

async fn timezone(
    State(state): State<AppState>,
    Query(query): Query<FidQuery>,
) -> Result<impl IntoResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let Some(tz) = state.repos.customers.timezone(&query.fid).await? else {
        return Err(AppError::External(
            StatusCode::NOT_FOUND,
            "timezone not configured",
        ));
    };

    // An unknown zone name is returned as-is with no abbreviation rather
    // than failing the request; the stored name is user-supplied.
    let tz_abbr = match tz.parse::<Tz>() {
        Ok(zone) => Utc::now().with_timezone(&zone).format("%Z").to_string(),
        Err(_) => String::new(),
    };

    Ok(Json(TimezoneResponse { tz, tz_abbr }))
}

async fn notification(
    State(state): State<AppState>,
    Query(query): Query<FidQuery>,
) -> Result<impl IntoResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let Some(notification) = state.repos.customers.aware_notification(&query.fid).await? else {
        return Err(AppError::External(
            StatusCode::NOT_FOUND,
            "notification config not found",
        ));
    };

    Ok(Json(notification))
}

async fn filter_type(
    State(state): State<AppState>,
    Query(query): Query<FidQuery>,
) -> Result<impl IntoResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let Some(settings) = state.repos.customers.filter_settings(&query.fid).await? else {
        return Err(AppError::External(
            StatusCode::NOT_FOUND,
            "filter settings not found",
        ));
    };

    // Azure tenants that sync an AD intranet group filter by security
    // group; everyone else filters by organizational unit.
    let filter_type =
        if settings.school_type == SCHOOL_TYPE_AZURE && !settings.ad_intranet.is_empty() {
            "secGrp"
        } else {
            "ou"
        };

    Ok(Json(FilterTypeResponse { filter_type }))
}
