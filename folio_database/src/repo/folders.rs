use std::collections::HashMap;

use chrono::Utc;
use folio_core::{
    content::{FolderPatch, NewFolder, DEFAULT_FOLDER_ICON},
    media::MediaStore,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::info;

use super::{merge, next_display_order, RepoError, RepoResult, Visibility};
use crate::entity::{
    design_work,
    folder::{self, Column, Entity, FolderSummary},
};

const ENTITY: &str = "Folder";

fn ordered(visibility: Visibility) -> Select<Entity> {
    visibility
        .apply(Entity::find(), Column::IsActive)
        .order_by_asc(Column::DisplayOrder)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

/// Lists folders, each with the number of active design items in it. Only
/// the folders are filtered by `visibility`; the count never includes
/// inactive items.
pub async fn list<C: ConnectionTrait>(db: &C, visibility: Visibility) -> RepoResult<Vec<FolderSummary>> {
    let folders = ordered(visibility).all(db).await?;

    let counts: HashMap<i32, i64> = active_items()
        .select_only()
        .column(design_work::Column::FolderId)
        .column_as(Expr::col(design_work::Column::Id).count(), "item_count")
        .group_by(design_work::Column::FolderId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(folders
        .into_iter()
        .map(|folder| FolderSummary {
            item_count: counts.get(&folder.id).copied().unwrap_or_default(),
            folder,
        })
        .collect())
}

fn active_items() -> Select<design_work::Entity> {
    Visibility::Public.apply(design_work::Entity::find(), design_work::Column::IsActive)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i32, visibility: Visibility) -> RepoResult<folder::Model> {
    visibility
        .apply(Entity::find_by_id(id), Column::IsActive)
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found(ENTITY, id))
}

/// One folder with its item count, as [`list`] reports it.
pub async fn get_summary<C: ConnectionTrait>(db: &C, id: i32, visibility: Visibility) -> RepoResult<FolderSummary> {
    let folder = get(db, id, visibility).await?;
    let item_count = active_items()
        .filter(design_work::Column::FolderId.eq(id))
        .count(db)
        .await?;

    Ok(FolderSummary {
        folder,
        item_count: i64::try_from(item_count).unwrap_or(i64::MAX),
    })
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewFolder) -> RepoResult<folder::Model> {
    new.validate()?;

    let display_order = match new.display_order {
        Some(n) => n,
        None => next_display_order(db, Entity::find()).await?,
    };

    let icon_type = new
        .icon_type
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| DEFAULT_FOLDER_ICON.to_string());

    let now = Utc::now();
    let model = folder::ActiveModel {
        name: Set(new.name.unwrap_or_default().trim().to_string()),
        description: Set(new.description),
        icon_type: Set(icon_type),
        display_order: Set(display_order),
        is_active: Set(new.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created folder {} '{}'", model.id, model.name);
    Ok(model)
}

pub async fn update<C: ConnectionTrait>(db: &C, id: i32, patch: FolderPatch) -> RepoResult<folder::Model> {
    patch.validate()?;

    let mut model: folder::ActiveModel = get(db, id, Visibility::All).await?.into();
    merge(&mut model.name, patch.name.map(|n| n.trim().to_string()));
    merge(&mut model.description, patch.description);
    merge(&mut model.icon_type, patch.icon_type.map(|i| i.trim().to_string()));
    merge(&mut model.display_order, patch.display_order);
    merge(&mut model.is_active, patch.is_active);
    model.updated_at = Set(Utc::now());

    Ok(model.update(db).await?)
}

/// Deletes a folder together with every design item in it, in one
/// transaction. The items' files are removed once the transaction has
/// committed; a file that cannot be removed is logged and left behind.
pub async fn delete(db: &DatabaseConnection, media: &MediaStore, id: i32) -> RepoResult<()> {
    let txn = db.begin().await?;

    // Dropping an uncommitted transaction rolls it back.
    get(&txn, id, Visibility::All).await?;

    let items = design_work::Entity::find()
        .filter(design_work::Column::FolderId.eq(id))
        .all(&txn)
        .await?;

    design_work::Entity::delete_many()
        .filter(design_work::Column::FolderId.eq(id))
        .exec(&txn)
        .await?;
    Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    info!("Deleted folder {id} and {} design item(s)", items.len());

    let urls = items.iter().flat_map(design_work::Model::file_urls).collect();
    media.remove_all(urls).await;
    Ok(())
}
