//! The read-only JSON API the frontend renders from. Only active content
//! is visible here.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use folio_core::content::EmailMessage;
use folio_database::{
    entity::{design_work, folder, project, resume_info, site_settings, web_link},
    repo::{design_work as work, folders, links, projects, singletons},
    Visibility,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::ApiResult,
    extract::{JsonBody, PathParam},
    AppContext,
};

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/:id", get(get_project))
        .route("/resume", get(get_resume))
        .route("/links", get(list_links))
        .route("/site-settings", get(get_site_settings))
        .route("/folders", get(list_folders))
        .route("/folders/:id", get(get_folder))
        .route("/folders/:id/work", get(list_folder_work))
        .route("/send-email", post(send_email))
        .fallback(super::not_found)
}

async fn list_projects(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<project::Model>>> {
    Ok(Json(projects::list(&ctx.db, Visibility::Public).await?))
}

async fn get_project(State(ctx): State<AppContext>, PathParam(id): PathParam<i32>) -> ApiResult<Json<project::Model>> {
    Ok(Json(projects::get(&ctx.db, id, Visibility::Public).await?))
}

async fn get_resume(State(ctx): State<AppContext>) -> ApiResult<Json<resume_info::Model>> {
    Ok(Json(singletons::resume(&ctx.db).await?))
}

async fn list_links(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<web_link::Model>>> {
    Ok(Json(links::list(&ctx.db, Visibility::Public).await?))
}

async fn get_site_settings(State(ctx): State<AppContext>) -> ApiResult<Json<site_settings::Model>> {
    Ok(Json(singletons::settings(&ctx.db).await?))
}

async fn list_folders(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<folder::FolderSummary>>> {
    Ok(Json(folders::list(&ctx.db, Visibility::Public).await?))
}

async fn get_folder(
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<folder::FolderSummary>> {
    Ok(Json(folders::get_summary(&ctx.db, id, Visibility::Public).await?))
}

async fn list_folder_work(
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Vec<design_work::Model>>> {
    Ok(Json(work::list_public_folder(&ctx.db, id).await?))
}

/// The contact form. Messages are validated and logged; delivery is left to
/// whoever reads the logs.
async fn send_email(JsonBody(msg): JsonBody<EmailMessage>) -> ApiResult<Json<Value>> {
    msg.validate()?;

    info!(
        from = msg.from.as_deref().unwrap_or_default(),
        subject = msg.subject.as_deref().unwrap_or_default(),
        "Contact form message received"
    );

    Ok(Json(json!({ "message": "Email sent successfully" })))
}
