//! Student directory endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use garde::Validate;
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(info))
}

#[derive(Debug, Deserialize, Validate)]
struct StudentQuery {
    #[garde(email)]
    email: String,
    /// Customer domain identifier; when present the lookup is scoped to it.
    #[garde(skip)]
    fid: Option<String>,
}

async fn info(
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
) -> Result<impl IntoResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let found = match query.fid.as_deref() {
        Some(fid) if !fid.is_empty() => {
            state.repos.students.find_with_fid(fid, &query.email).await?
        }
        _ => state.repos.students.find(&query.email).await?,
    };

    let Some(student) = found else {
        return Err(AppError::External(
            StatusCode::NOT_FOUND,
            "student not found",
        ));
    };

    Ok(Json(student))
}
