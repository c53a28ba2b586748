//! Handlers for short URL management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::analytics::AnalyticsResponse;
use crate::api::dto::pagination::ListParams;
use crate::api::dto::urls::{
    CreateUrlRequest, UpdateUrlRequest, UrlInfoResponse, UrlListResponse, UrlResponse,
};
use crate::api::middleware::auth::{CurrentUser, MaybeUser};
use crate::application::services::MAX_PAGE_SIZE;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/v1/urls`
///
/// Authentication is optional. Anonymous links have no owner and cannot be
/// listed, edited or deleted later.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_alias": "my-link",
///   "expires_at": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 `validation_error` / `invalid_alias`
/// - 409 `alias_taken`
/// - 500 `exhausted_retries` if no free random code was found
pub async fn create_url_handler(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<UrlResponse>), AppError> {
    payload.validate()?;

    let (draft, alias) = payload.into_draft(user.map(|u| u.user_id));
    let record = state
        .link_service
        .create_url(draft, alias.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UrlResponse::from_record(record, &state.settings)),
    ))
}

/// Lists the caller's active URLs, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/urls?limit=20&offset=0`
///
/// `limit` is capped at 100.
pub async fn list_urls_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<UrlListResponse>, AppError> {
    let (records, total) = state
        .link_service
        .list_for_owner(user.user_id, params.limit(), params.offset())
        .await?;

    let limit = params.limit().clamp(1, MAX_PAGE_SIZE);
    let items = records
        .into_iter()
        .map(|r| UrlResponse::from_record(r, &state.settings))
        .collect();

    Ok(Json(UrlListResponse {
        items,
        total,
        limit,
        offset: params.offset().max(0),
    }))
}

/// Updates one of the caller's URLs.
///
/// # Endpoint
///
/// `PUT /api/v1/urls/{id}`
///
/// Absent fields keep their current value. The short code never changes.
pub async fn update_url_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUrlRequest>,
) -> Result<Json<UrlResponse>, AppError> {
    payload.validate()?;

    let record = state
        .link_service
        .update_for_owner(id, user.user_id, payload.into())
        .await?;

    Ok(Json(UrlResponse::from_record(record, &state.settings)))
}

/// Soft-deletes one of the caller's URLs.
///
/// # Endpoint
///
/// `DELETE /api/v1/urls/{id}`
///
/// Returns 204 No Content. The code stops resolving immediately.
pub async fn delete_url_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_for_owner(id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Click analytics for one of the caller's URLs.
///
/// # Endpoint
///
/// `GET /api/v1/urls/{id}/analytics`
///
/// Returns aggregate counters plus the most recent 1000 clicks.
pub async fn url_analytics_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let analytics = state
        .analytics_service
        .url_analytics(id, user.user_id)
        .await?;

    Ok(Json(AnalyticsResponse::new(analytics, &state.settings)))
}

/// Public metadata for a short code, without redirecting or counting a click.
///
/// # Endpoint
///
/// `GET /api/v1/urls/{code}/info`
///
/// # Errors
///
/// - 404 if the code does not resolve
/// - 410 if the link has expired
pub async fn url_info_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<UrlInfoResponse>, AppError> {
    let record = state.redirect_service.resolve(&code).await?;
    let stats = state.analytics_service.stats(record.id).await?;

    Ok(Json(UrlInfoResponse {
        short_url: state.settings.short_url(&record.short_code),
        short_code: record.short_code,
        original_url: record.original_url,
        title: record.title,
        total_clicks: stats.total_clicks,
        created_at: record.created_at,
        expires_at: record.expires_at,
    }))
}
