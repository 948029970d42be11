use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Application, ApplicationId, ApplicationPatch, Email, EmailId, EmailPatch, NewApplication,
    NewEmail, NewProfile, Profile, ProfileId, ProfilePatch,
};
use super::filter::ApplicationFilter;
use super::repository::TrackerRepository;
use super::service::{TrackerService, TrackerServiceError};
use super::stats::{AnalyticsReport, StatsSummary, DEFAULT_WINDOW_DAYS};
use crate::error::AppError;

type SharedService<R> = State<Arc<TrackerService<R>>>;

/// Router builder exposing the tracker's REST surface.
pub fn tracker_router<R>(service: Arc<TrackerService<R>>) -> Router
where
    R: TrackerRepository + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            get(list_applications_handler::<R>).post(create_application_handler::<R>),
        )
        .route(
            "/api/applications/:id",
            get(get_application_handler::<R>)
                .patch(update_application_handler::<R>)
                .delete(delete_application_handler::<R>),
        )
        .route(
            "/api/applications/:id/emails",
            get(application_emails_handler::<R>),
        )
        .route(
            "/api/applications/:id/sync-emails",
            post(sync_emails_handler::<R>),
        )
        .route("/api/emails", post(create_email_handler::<R>))
        .route("/api/emails/:id", patch(update_email_handler::<R>))
        .route(
            "/api/profile",
            get(get_profile_handler::<R>).post(create_profile_handler::<R>),
        )
        .route("/api/profile/:id", patch(update_profile_handler::<R>))
        .route("/api/stats", get(stats_handler::<R>))
        .route("/api/analytics", get(analytics_handler::<R>))
        .route(
            "/api/export/applications.csv",
            get(export_handler::<R>),
        )
        .with_state(service)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Lookups of a single application report absence as 404; everything else is a server error.
fn lookup_error(err: TrackerServiceError) -> AppError {
    if err.is_not_found() {
        AppError::NotFound(err.to_string())
    } else {
        AppError::Tracker(err)
    }
}

pub(crate) async fn list_applications_handler<R>(
    State(service): SharedService<R>,
    filter: Result<Query<ApplicationFilter>, QueryRejection>,
) -> Result<Json<Vec<Application>>, AppError>
where
    R: TrackerRepository + 'static,
{
    let filter = query(filter)?;
    Ok(Json(service.list_applications(&filter)?))
}

pub(crate) async fn get_application_handler<R>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
) -> Result<Json<Application>, AppError>
where
    R: TrackerRepository + 'static,
{
    let application = service
        .application(&ApplicationId(id))
        .map_err(lookup_error)?;
    Ok(Json(application))
}

pub(crate) async fn create_application_handler<R>(
    State(service): SharedService<R>,
    payload: Result<Json<NewApplication>, JsonRejection>,
) -> Result<Json<Application>, AppError>
where
    R: TrackerRepository + 'static,
{
    let draft = body(payload)?;
    Ok(Json(service.create_application(draft).await?))
}

pub(crate) async fn update_application_handler<R>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
    payload: Result<Json<ApplicationPatch>, JsonRejection>,
) -> Result<Json<Application>, AppError>
where
    R: TrackerRepository + 'static,
{
    let patch = body(payload)?;
    let application = service
        .update_application(&ApplicationId(id), patch)
        .await?;
    Ok(Json(application))
}

pub(crate) async fn delete_application_handler<R>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError>
where
    R: TrackerRepository + 'static,
{
    service.delete_application(&ApplicationId(id))?;
    Ok(Json(json!({ "success": true })))
}

pub(crate) async fn application_emails_handler<R>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Email>>, AppError>
where
    R: TrackerRepository + 'static,
{
    Ok(Json(service.emails_for_application(&ApplicationId(id))?))
}

pub(crate) async fn sync_emails_handler<R>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Email>>, AppError>
where
    R: TrackerRepository + 'static,
{
    let emails = service
        .sync_emails(&ApplicationId(id))
        .await
        .map_err(lookup_error)?;
    Ok(Json(emails))
}

pub(crate) async fn create_email_handler<R>(
    State(service): SharedService<R>,
    payload: Result<Json<NewEmail>, JsonRejection>,
) -> Result<Json<Email>, AppError>
where
    R: TrackerRepository + 'static,
{
    let draft = body(payload)?;
    Ok(Json(service.create_email(draft)?))
}

pub(crate) async fn update_email_handler<R>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
    payload: Result<Json<EmailPatch>, JsonRejection>,
) -> Result<Json<Email>, AppError>
where
    R: TrackerRepository + 'static,
{
    let patch = body(payload)?;
    Ok(Json(service.update_email(&EmailId(id), patch)?))
}

pub(crate) async fn get_profile_handler<R>(
    State(service): SharedService<R>,
) -> Result<Json<Option<Profile>>, AppError>
where
    R: TrackerRepository + 'static,
{
    Ok(Json(service.profile()?))
}

pub(crate) async fn create_profile_handler<R>(
    State(service): SharedService<R>,
    payload: Result<Json<NewProfile>, JsonRejection>,
) -> Result<Json<Profile>, AppError>
where
    R: TrackerRepository + 'static,
{
    let draft = body(payload)?;
    Ok(Json(service.create_profile(draft)?))
}

pub(crate) async fn update_profile_handler<R>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Json<Profile>, AppError>
where
    R: TrackerRepository + 'static,
{
    let patch = body(payload)?;
    Ok(Json(service.update_profile(&ProfileId(id), patch)?))
}

pub(crate) async fn stats_handler<R>(
    State(service): SharedService<R>,
) -> Result<Json<StatsSummary>, AppError>
where
    R: TrackerRepository + 'static,
{
    Ok(Json(service.stats()?))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnalyticsParams {
    #[serde(default)]
    days: Option<u32>,
}

pub(crate) async fn analytics_handler<R>(
    State(service): SharedService<R>,
    params: Result<Query<AnalyticsParams>, QueryRejection>,
) -> Result<Json<AnalyticsReport>, AppError>
where
    R: TrackerRepository + 'static,
{
    let params = query(params)?;
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    Ok(Json(service.analytics(days, Utc::now())?))
}

pub(crate) async fn export_handler<R>(State(service): SharedService<R>) -> Result<Response, AppError>
where
    R: TrackerRepository + 'static,
{
    let csv = service.export_csv()?;
    Ok((
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.as_ref()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"applications.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
