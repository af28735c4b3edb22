//! At-risk score endpoints.
//!
//! Risk events are cached key/value pairs (`{email}:{epochSeconds}` →
//! `{score}:{sourceTag}:{opaqueId}`); the user's total score is the sum
//! over all of their events, recomputed on every mutation. The DB-backed
//! score rows are a separate read path that never mixes with the cached
//! totals.
//!
//! ## Endpoints
//!
//! - POST /at-risk/cache/create - record a risk event, return the new total
//! - DELETE /at-risk/cache/delete - remove a risk event, return the new total
//! - GET /at-risk/score - DB-sourced score rows for a user
//! - POST /at-risk/extend-ttl - reset the TTL of all of a user's events
//! - GET /at-risk/event-score-details - resolve one event by timestamp

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{CodecError, EventKey, EventValue},
    error::AppError,
    risk::RiskError,
    state::AppState,
};

/// TTL applied by extend-ttl when the request does not carry one (90 days).
const DEFAULT_EXTEND_TTL_SECS: u64 = 60 * 60 * 24 * 90;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cache/create", post(create_cache))
        .route("/cache/delete", delete(delete_cache))
        .route("/extend-ttl", post(extend_ttl))
        .route("/score", get(score))
        .route("/event-score-details", get(event_score_details))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheRequest {
    at_risk_key: String,
    at_risk_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheDeleteRequest {
    at_risk_key: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ScoreQuery {
    #[garde(email)]
    user_email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ExtendTtlRequest {
    #[garde(email)]
    user_email: String,
    #[garde(skip)]
    ttl: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct EventScoreQuery {
    #[garde(email)]
    user_email: String,
    #[garde(pattern(r"^[0-9]+$"))]
    timestamp: String,
    #[garde(skip)]
    mid: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalScoreResponse {
    total_at_risk_score: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventScoreResponse {
    at_risk_key: String,
    at_risk_value: String,
    at_risk_score: i64,
}

/// Maps the engine's error set onto HTTP: absence is the caller's problem,
/// everything else is ours.
fn risk_error(err: RiskError) -> AppError {
    match err {
        RiskError::NotFound => AppError::External(StatusCode::NOT_FOUND, "risk event not found"),
        other => AppError::Internal(other.into()),
    }
}

async fn create_cache(
    State(state): State<AppState>,
    Json(payload): Json<CacheRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key: EventKey = payload
        .at_risk_key
        .parse()
        .map_err(|e: CodecError| AppError::Validation(format!("atRiskKey: {e}")))?;
    let value: EventValue = payload
        .at_risk_value
        .parse()
        .map_err(|e: CodecError| AppError::Validation(format!("atRiskValue: {e}")))?;

    let total = state
        .risk
        .create_event(&key, &value)
        .await
        .map_err(risk_error)?;

    Ok(Json(TotalScoreResponse {
        total_at_risk_score: total,
    }))
}

async fn delete_cache(
    State(state): State<AppState>,
    Json(payload): Json<CacheDeleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key: EventKey = payload
        .at_risk_key
        .parse()
        .map_err(|e: CodecError| AppError::Validation(format!("atRiskKey: {e}")))?;

    let total = state.risk.delete_event(&key).await.map_err(risk_error)?;

    Ok(Json(TotalScoreResponse {
        total_at_risk_score: total,
    }))
}

async fn score(
    State(state): State<AppState>,
    Query(query): Query<ScoreQuery>,
) -> Result<impl IntoResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let rows = state.repos.scores.risk_scores(&query.user_email).await?;

    Ok(Json(rows))
}

async fn extend_ttl(
    State(state): State<AppState>,
    Json(payload): Json<ExtendTtlRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let ttl = payload.ttl.unwrap_or(DEFAULT_EXTEND_TTL_SECS);

    state
        .risk
        .extend_ttl(&payload.user_email, ttl)
        .await
        .map_err(risk_error)?;

    tracing::info!(email = %payload.user_email, ttl, "extended risk event ttl");
    Ok((StatusCode::OK, "ttl extended"))
}

async fn event_score_details(
    State(state): State<AppState>,
    Query(query): Query<EventScoreQuery>,
) -> Result<impl IntoResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let resolved = state
        .risk
        .get_event_score(
            &query.user_email,
            &query.timestamp,
            query.mid.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(risk_error)?;

    Ok(Json(EventScoreResponse {
        at_risk_key: resolved.key,
        at_risk_value: resolved.value,
        at_risk_score: resolved.score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskScoreRow;
    use crate::repos::MockScoreRepo;
    use crate::stores::MockCacheStore;
    use crate::test_utils::TestStateBuilder;
    use http_body_util::BodyExt;

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_cache_records_event_and_returns_total() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_set_with_ttl()
            .withf(|k, v, ttl| {
                k == "sam@school.edu:1684323604"
                    && v == "45:scan:1dc13ds5c1651"
                    && *ttl == 5_184_000
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        cache
            .expect_keys_by_prefix()
            .returning(|_| Ok(vec!["sam@school.edu:1684323604".to_string()]));
        cache
            .expect_get()
            .returning(|_| Ok(Some("45:scan:1dc13ds5c1651".to_string())));

        let state = TestStateBuilder::new().with_cache(cache).build();

        let payload = CacheRequest {
            at_risk_key: "sam@school.edu:1684323604".to_string(),
            at_risk_value: "45:scan:1dc13ds5c1651".to_string(),
        };

        let response = create_cache(State(state), Json(payload))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_json(response).await,
            serde_json::json!({"totalAtRiskScore": 45})
        );
    }

    #[tokio::test]
    async fn create_cache_rejects_malformed_key() {
        let state = TestStateBuilder::new().build();

        let payload = CacheRequest {
            at_risk_key: "not-an-email".to_string(),
            at_risk_value: "45:scan:1dc13ds5c1651".to_string(),
        };

        let response = create_cache(State(state), Json(payload))
            .await
            .err()
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_cache_rejects_malformed_value() {
        let state = TestStateBuilder::new().build();

        let payload = CacheRequest {
            at_risk_key: "sam@school.edu:1684323604".to_string(),
            at_risk_value: "dede:scan:1dc13ds5c1651".to_string(),
        };

        let response = create_cache(State(state), Json(payload))
            .await
            .err()
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_cache_maps_missing_event_to_404() {
        let mut cache = MockCacheStore::new();
        cache.expect_exists().returning(|_| Ok(false));

        let state = TestStateBuilder::new().with_cache(cache).build();

        let payload = CacheDeleteRequest {
            at_risk_key: "sam@school.edu:1684323604".to_string(),
        };

        let response = delete_cache(State(state), Json(payload))
            .await
            .err()
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn score_returns_db_rows() {
        let mut scores = MockScoreRepo::new();
        scores
            .expect_risk_scores()
            .withf(|email| email == "sam@school.edu")
            .returning(|_| {
                Ok(vec![RiskScoreRow {
                    user_email: "sam@school.edu".to_string(),
                    self_harm_score: "70".to_string(),
                }])
            });

        let state = TestStateBuilder::new().with_score_repo(scores).build();

        let query = ScoreQuery {
            user_email: "sam@school.edu".to_string(),
        };

        let response = score(State(state), Query(query))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_json(response).await,
            serde_json::json!([{"userEmail": "sam@school.edu", "selfHarmScore": "70"}])
        );
    }

    #[tokio::test]
    async fn score_rejects_invalid_email() {
        let state = TestStateBuilder::new().build();

        let query = ScoreQuery {
            user_email: "not-an-email".to_string(),
        };

        let response = score(State(state), Query(query))
            .await
            .err()
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn extend_ttl_defaults_to_ninety_days() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_keys_by_prefix()
            .returning(|_| Ok(vec!["sam@school.edu:1".to_string()]));
        cache
            .expect_set_ttl()
            .withf(|_, ttl| *ttl == 7_776_000)
            .times(1)
            .returning(|_, _| Ok(()));

        let state = TestStateBuilder::new().with_cache(cache).build();

        let payload = ExtendTtlRequest {
            user_email: "sam@school.edu".to_string(),
            ttl: None,
        };

        let response = extend_ttl(State(state), Json(payload))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn event_score_details_resolves_direct_hit() {
        let mut cache = MockCacheStore::new();
        cache.expect_exists().returning(|_| Ok(true));
        cache
            .expect_get()
            .returning(|_| Ok(Some("46:scan:<msg-id-123".to_string())));

        let state = TestStateBuilder::new().with_cache(cache).build();

        let query = EventScoreQuery {
            user_email: "sam@school.edu".to_string(),
            timestamp: "1684323604".to_string(),
            mid: Some("<msg-id-123".to_string()),
        };

        let response = event_score_details(State(state), Query(query))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_json(response).await,
            serde_json::json!({
                "atRiskKey": "sam@school.edu:1684323604",
                "atRiskValue": "46:scan:<msg-id-123",
                "atRiskScore": 46,
            })
        );
    }

    #[tokio::test]
    async fn event_score_details_rejects_non_numeric_timestamp() {
        let state = TestStateBuilder::new().build();

        let query = EventScoreQuery {
            user_email: "sam@school.edu".to_string(),
            timestamp: "16fs54dfs5d46".to_string(),
            mid: None,
        };

        let response = event_score_details(State(state), Query(query))
            .await
            .err()
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn event_score_details_maps_missing_event_to_404() {
        let mut cache = MockCacheStore::new();
        cache.expect_exists().returning(|_| Ok(false));
        cache.expect_get().returning(|_| Ok(None));

        let state = TestStateBuilder::new().with_cache(cache).build();

        let query = EventScoreQuery {
            user_email: "sam@school.edu".to_string(),
            timestamp: "1684323604000".to_string(),
            mid: None,
        };

        let response = event_score_details(State(state), Query(query))
            .await
            .err()
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
