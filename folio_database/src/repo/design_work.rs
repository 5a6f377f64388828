use chrono::Utc;
use folio_core::{
    content::{DesignWorkPatch, NewDesignWork},
    media::{MediaStore, StoredMedia, Upload, UploadKind},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use tracing::{info, warn};

use super::{folders, merge, next_display_order, RepoError, RepoResult, Visibility};
use crate::entity::design_work::{self, Column, Entity};

const ENTITY: &str = "Design work";

fn ordered(visibility: Visibility) -> Select<Entity> {
    visibility
        .apply(Entity::find(), Column::IsActive)
        .order_by_asc(Column::DisplayOrder)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

/// Lists design items, optionally only those in one folder.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    folder_id: Option<i32>,
    visibility: Visibility,
) -> RepoResult<Vec<design_work::Model>> {
    let mut select = ordered(visibility);
    if let Some(folder_id) = folder_id {
        select = select.filter(Column::FolderId.eq(folder_id));
    }
    Ok(select.all(db).await?)
}

/// The public contents of a folder. A folder that does not exist or is not
/// active is reported as missing.
pub async fn list_public_folder<C: ConnectionTrait>(db: &C, folder_id: i32) -> RepoResult<Vec<design_work::Model>> {
    folders::get(db, folder_id, Visibility::Public).await?;
    list(db, Some(folder_id), Visibility::Public).await
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> RepoResult<design_work::Model> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found(ENTITY, id))
}

/// Stores an uploaded file and records it as a design item in `folder_id`.
///
/// Nothing is written to disk unless the folder exists and the metadata and
/// file are acceptable. If the row cannot be inserted the files just written
/// are removed again.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    media: &MediaStore,
    folder_id: i32,
    work: NewDesignWork,
    upload: Upload,
) -> RepoResult<design_work::Model> {
    folders::get(db, folder_id, Visibility::All).await?;
    work.validate()?;
    upload.validate()?;

    let stored = media.store(upload, UploadKind::DesignWork).await?;

    match insert(db, folder_id, work, &stored).await {
        Ok(model) => {
            info!(
                "Created design item {} '{}' in folder {folder_id} ({})",
                model.id, model.title, model.file_url
            );
            Ok(model)
        }
        Err(err) => {
            warn!("Could not record upload {}; removing its files", stored.filename);
            media.remove_all(stored.urls()).await;
            Err(err)
        }
    }
}

/// Stores several files into one folder, each titled after its original
/// filename. Every file and title is checked before any is written. If a
/// later item still fails, the items already created by this call are
/// removed again. Returns the items created, in upload order.
pub async fn create_many<C: ConnectionTrait>(
    db: &C,
    media: &MediaStore,
    folder_id: i32,
    uploads: Vec<Upload>,
) -> RepoResult<Vec<design_work::Model>> {
    folders::get(db, folder_id, Visibility::All).await?;
    if uploads.is_empty() {
        return Err(folio_core::FolioError::EmptyUpload.into());
    }

    let mut pending = Vec::with_capacity(uploads.len());
    for upload in uploads {
        upload.validate()?;
        let work = NewDesignWork::titled(bulk_title(&upload));
        work.validate()?;
        pending.push((work, upload));
    }

    let mut created = Vec::with_capacity(pending.len());
    for (work, upload) in pending {
        match create(db, media, folder_id, work, upload).await {
            Ok(model) => created.push(model),
            Err(err) => {
                warn!(
                    "Bulk upload into folder {folder_id} failed after {} item(s); removing them",
                    created.len()
                );
                for model in &created {
                    if let Err(cleanup) = delete(db, media, model.id).await {
                        warn!("Could not remove design item {}: {cleanup}", model.id);
                    }
                }
                return Err(err);
            }
        }
    }

    Ok(created)
}

/// The file stem, or the whole original filename when the stem is blank.
fn bulk_title(upload: &Upload) -> String {
    let stem = upload.stem();
    if stem.trim().is_empty() {
        upload.original_filename.trim().to_string()
    } else {
        stem
    }
}

async fn insert<C: ConnectionTrait>(
    db: &C,
    folder_id: i32,
    work: NewDesignWork,
    stored: &StoredMedia,
) -> RepoResult<design_work::Model> {
    let display_order = match work.display_order {
        Some(n) => n,
        None => next_display_order(db, Entity::find().filter(Column::FolderId.eq(folder_id))).await?,
    };

    let now = Utc::now();
    let model = design_work::ActiveModel {
        title: Set(work.title.unwrap_or_default().trim().to_string()),
        description: Set(work.description),
        file_url: Set(stored.file_url.clone()),
        thumbnail_url: Set(stored.thumbnail_url.clone()),
        file_type: Set(Some(stored.file_type.clone())),
        file_size: Set(Some(stored.file_size)),
        width: Set(stored.width),
        height: Set(stored.height),
        client_name: Set(work.client_name),
        project_date: Set(work.project_date),
        tags: Set(work.tags),
        display_order: Set(display_order),
        is_active: Set(work.is_active),
        folder_id: Set(folder_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Applies a partial update. Moving an item requires the target folder to
/// exist. The stored file itself never changes.
pub async fn update<C: ConnectionTrait>(db: &C, id: i32, patch: DesignWorkPatch) -> RepoResult<design_work::Model> {
    patch.validate()?;
    let folder_id = patch.folder_id()?;
    let project_date = patch.project_date()?;

    let mut model: design_work::ActiveModel = get(db, id).await?.into();

    if let Some(folder_id) = folder_id {
        folders::get(db, folder_id, Visibility::All).await?;
        model.folder_id = Set(folder_id);
    }
    merge(&mut model.title, patch.title.map(|t| t.trim().to_string()));
    merge(&mut model.description, patch.description);
    merge(&mut model.client_name, patch.client_name);
    merge(&mut model.tags, patch.tags);
    merge(&mut model.project_date, project_date);
    merge(&mut model.display_order, patch.display_order);
    merge(&mut model.is_active, patch.is_active);
    model.updated_at = Set(Utc::now());

    Ok(model.update(db).await?)
}

/// Deletes the item and then its file and thumbnail.
pub async fn delete<C: ConnectionTrait>(db: &C, media: &MediaStore, id: i32) -> RepoResult<()> {
    let item = get(db, id).await?;
    Entity::delete_by_id(id).exec(db).await?;
    info!("Deleted design item {id} '{}'", item.title);

    media.remove_all(item.file_urls()).await;
    Ok(())
}
