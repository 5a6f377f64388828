use chrono::Utc;
use folio_core::content::{LinkPatch, NewLink};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use tracing::info;

use super::{merge, next_display_order, RepoError, RepoResult, Visibility};
use crate::entity::web_link::{self, Column, Entity};

const ENTITY: &str = "Link";

fn ordered(visibility: Visibility) -> Select<Entity> {
    visibility
        .apply(Entity::find(), Column::IsActive)
        .order_by_asc(Column::DisplayOrder)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

pub async fn list<C: ConnectionTrait>(db: &C, visibility: Visibility) -> RepoResult<Vec<web_link::Model>> {
    Ok(ordered(visibility).all(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> RepoResult<web_link::Model> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found(ENTITY, id))
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewLink) -> RepoResult<web_link::Model> {
    new.validate()?;

    let display_order = match new.display_order {
        Some(n) => n,
        None => next_display_order(db, Entity::find()).await?,
    };

    let model = web_link::ActiveModel {
        title: Set(new.title.unwrap_or_default().trim().to_string()),
        url: Set(new.url.unwrap_or_default().trim().to_string()),
        icon: Set(new.icon),
        display_order: Set(display_order),
        is_active: Set(new.is_active.unwrap_or(true)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created link {} -> {}", model.id, model.url);
    Ok(model)
}

pub async fn update<C: ConnectionTrait>(db: &C, id: i32, patch: LinkPatch) -> RepoResult<web_link::Model> {
    patch.validate()?;

    let mut model: web_link::ActiveModel = get(db, id).await?.into();
    merge(&mut model.title, patch.title.map(|t| t.trim().to_string()));
    merge(&mut model.url, patch.url.map(|u| u.trim().to_string()));
    merge(&mut model.icon, patch.icon);
    merge(&mut model.display_order, patch.display_order);
    merge(&mut model.is_active, patch.is_active);

    // A patch that changes nothing is not an error.
    if !model.is_changed() {
        return get(db, id).await;
    }
    Ok(model.update(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> RepoResult<()> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(RepoError::not_found(ENTITY, id));
    }

    info!("Deleted link {id}");
    Ok(())
}
