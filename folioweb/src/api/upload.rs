//! Multipart endpoints. Each of them checks the caller before the body is
//! read, and no file is written until the rest of the request has been
//! validated.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use folio_core::{
    content::{parse_profile_slot, NewDesignWork},
    media::{StoredMedia, Upload, UploadKind},
    FolioError,
};
use folio_database::{entity::design_work, repo};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    auth::AuthenticatedIdentity,
    error::ApiResult,
    extract::{MultipartBody, PathParam},
    AppContext,
};

/// A multipart body split into its files and its text fields.
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<Upload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    debug!("Received file field {name:?} ({file_name:?}, {} bytes)", data.len());
                    form.files.push(Upload::new(file_name, data.to_vec()));
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// The one file a single-file endpoint expects.
    fn single_file(&mut self) -> Result<Upload, FolioError> {
        match self.files.len() {
            0 => Err(FolioError::EmptyUpload),
            _ => Ok(self.files.swap_remove(0)),
        }
    }
}

/// Stores an image that is not tied to any record, e.g. a project picture
/// the client will reference by URL.
pub async fn upload_image(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    MultipartBody(multipart): MultipartBody,
) -> ApiResult<Json<StoredMedia>> {
    let upload = UploadForm::read(multipart).await?.single_file()?;
    Ok(Json(ctx.media.store(upload, UploadKind::General).await?))
}

pub async fn update_profile_image(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    MultipartBody(multipart): MultipartBody,
) -> ApiResult<Json<Value>> {
    let mut form = UploadForm::read(multipart).await?;
    let slot = parse_profile_slot(form.fields.get("slot").map(String::as_str))?;
    let upload = form.single_file()?;

    let stored = ctx.media.store(upload, UploadKind::ProfileImage(slot)).await?;
    if let Err(err) = repo::singletons::set_profile_image(&ctx.db, &ctx.media, slot, stored.file_url.clone()).await {
        ctx.media.remove_all(stored.urls()).await;
        return Err(err.into());
    }

    Ok(Json(json!({
        "filename": stored.filename,
        "url": stored.file_url,
        "slot": slot.to_string(),
    })))
}

/// Creates one design item from a file plus its metadata fields.
pub async fn create_design_work(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    MultipartBody(multipart): MultipartBody,
) -> ApiResult<(StatusCode, Json<design_work::Model>)> {
    let mut form = UploadForm::read(multipart).await?;
    let (folder_id, work) = NewDesignWork::from_form(&form.fields)?;

    // Folder and title problems are reported ahead of a missing file.
    repo::folders::get(&ctx.db, folder_id, folio_database::Visibility::All).await?;
    work.validate()?;
    let upload = form.single_file()?;

    let item = repo::design_work::create(&ctx.db, &ctx.media, folder_id, work, upload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Adds every file in the request to a folder.
pub async fn upload_to_folder(
    _auth: AuthenticatedIdentity,
    State(ctx): State<AppContext>,
    PathParam(folder_id): PathParam<i32>,
    MultipartBody(multipart): MultipartBody,
) -> ApiResult<(StatusCode, Json<Vec<design_work::Model>>)> {
    let form = UploadForm::read(multipart).await?;
    let items = repo::design_work::create_many(&ctx.db, &ctx.media, folder_id, form.files).await?;
    Ok((StatusCode::CREATED, Json(items)))
}
