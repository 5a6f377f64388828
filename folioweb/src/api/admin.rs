//! The admin API. Every handler except login, logout and the uploaded-file
//! route starts with [`AuthenticatedIdentity`].

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use folio_core::content::{
    DesignWorkPatch, FolderPatch, LinkPatch, NewFolder, NewLink, NewProject, ProjectPatch, ResumePatch,
    SettingsPatch,
};
use folio_database::{
    entity::{design_work, folder, project, resume_info, site_settings, web_link},
    repo::{design_work as work, folders, links, projects, singletons},
    Visibility,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::upload;
use crate::{
    asset,
    auth::{self, AuthenticatedIdentity},
    error::ApiResult,
    extract::{JsonBody, PathParam, QueryParams},
    AppContext,
};

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", put(update_project).delete(delete_project))
        .route("/resume", get(get_resume).put(update_resume))
        .route("/links", get(list_links).post(create_link))
        .route("/links/:id", put(update_link).delete(delete_link))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/upload-image", post(upload::upload_image))
        .route("/update-profile-image", post(upload::update_profile_image))
        .route("/folders", get(list_folders).post(create_folder))
        .route("/folders/:id", put(update_folder).delete(delete_folder))
        .route("/folders/:id/upload", post(upload::upload_to_folder))
        .route("/design-work", get(list_design_work).post(upload::create_design_work))
        .route("/design-work/:id", put(update_design_work).delete(delete_design_work))
        .route("/uploads/:filename", get(asset::upload_handler))
        .fallback(super::not_found)
}

fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "message": format!("{what} deleted") }))
}

// Projects

async fn list_projects(_auth: AuthenticatedIdentity, State(ctx): State<AppContext>) -> ApiResult<Json<Vec<project::Model>>> {
    Ok(Json(projects::list(&ctx.db, Visibility::All).await?))
}

async fn create_project(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    JsonBody(new): JsonBody<NewProject>,
) -> ApiResult<(StatusCode, Json<project::Model>)> {
    Ok((StatusCode::CREATED, Json(projects::create(&ctx.db, new).await?)))
}

async fn update_project(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
    JsonBody(patch): JsonBody<ProjectPatch>,
) -> ApiResult<Json<project::Model>> {
    Ok(Json(projects::update(&ctx.db, id, patch).await?))
}

async fn delete_project(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Value>> {
    projects::delete(&ctx.db, id).await?;
    Ok(deleted("Project"))
}

// Singletons

async fn get_resume(_auth: AuthenticatedIdentity, State(ctx): State<AppContext>) -> ApiResult<Json<resume_info::Model>> {
    Ok(Json(singletons::resume(&ctx.db).await?))
}

async fn update_resume(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    JsonBody(patch): JsonBody<ResumePatch>,
) -> ApiResult<Json<resume_info::Model>> {
    Ok(Json(singletons::update_resume(&ctx.db, patch).await?))
}

async fn get_settings(_auth: AuthenticatedIdentity, State(ctx): State<AppContext>) -> ApiResult<Json<site_settings::Model>> {
    Ok(Json(singletons::settings(&ctx.db).await?))
}

async fn update_settings(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    JsonBody(patch): JsonBody<SettingsPatch>,
) -> ApiResult<Json<site_settings::Model>> {
    Ok(Json(singletons::update_settings(&ctx.db, patch).await?))
}

// Links

async fn list_links(_auth: AuthenticatedIdentity, State(ctx): State<AppContext>) -> ApiResult<Json<Vec<web_link::Model>>> {
    Ok(Json(links::list(&ctx.db, Visibility::All).await?))
}

async fn create_link(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    JsonBody(new): JsonBody<NewLink>,
) -> ApiResult<(StatusCode, Json<web_link::Model>)> {
    Ok((StatusCode::CREATED, Json(links::create(&ctx.db, new).await?)))
}

async fn update_link(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
    JsonBody(patch): JsonBody<LinkPatch>,
) -> ApiResult<Json<web_link::Model>> {
    Ok(Json(links::update(&ctx.db, id, patch).await?))
}

async fn delete_link(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Value>> {
    links::delete(&ctx.db, id).await?;
    Ok(deleted("Link"))
}

// Folders

async fn list_folders(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
) -> ApiResult<Json<Vec<folder::FolderSummary>>> {
    Ok(Json(folders::list(&ctx.db, Visibility::All).await?))
}

async fn create_folder(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    JsonBody(new): JsonBody<NewFolder>,
) -> ApiResult<(StatusCode, Json<folder::Model>)> {
    Ok((StatusCode::CREATED, Json(folders::create(&ctx.db, new).await?)))
}

async fn update_folder(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
    JsonBody(patch): JsonBody<FolderPatch>,
) -> ApiResult<Json<folder::Model>> {
    Ok(Json(folders::update(&ctx.db, id, patch).await?))
}

async fn delete_folder(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Value>> {
    folders::delete(&ctx.db, &ctx.media, id).await?;
    Ok(deleted("Folder"))
}

// Design work

#[derive(Debug, Default, Deserialize)]
struct DesignWorkQuery {
    folder_id: Option<i32>,
}

async fn list_design_work(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    QueryParams(query): QueryParams<DesignWorkQuery>,
) -> ApiResult<Json<Vec<design_work::Model>>> {
    Ok(Json(work::list(&ctx.db, query.folder_id, Visibility::All).await?))
}

async fn update_design_work(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
    JsonBody(patch): JsonBody<DesignWorkPatch>,
) -> ApiResult<Json<design_work::Model>> {
    Ok(Json(work::update(&ctx.db, id, patch).await?))
}

async fn delete_design_work(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Value>> {
    work::delete(&ctx.db, &ctx.media, id).await?;
    Ok(deleted("Design work"))
}
