use chrono::Utc;
use folio_core::content::{NewProject, ProjectPatch};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use tracing::info;

use super::{merge, next_display_order, RepoError, RepoResult, Visibility};
use crate::entity::project::{self, Column, Entity};

const ENTITY: &str = "Project";

fn ordered(visibility: Visibility) -> Select<Entity> {
    visibility
        .apply(Entity::find(), Column::IsActive)
        .order_by_asc(Column::DisplayOrder)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

pub async fn list<C: ConnectionTrait>(db: &C, visibility: Visibility) -> RepoResult<Vec<project::Model>> {
    Ok(ordered(visibility).all(db).await?)
}

/// Fetches one project. Inactive projects are invisible to the public.
pub async fn get<C: ConnectionTrait>(db: &C, id: i32, visibility: Visibility) -> RepoResult<project::Model> {
    visibility
        .apply(Entity::find_by_id(id), Column::IsActive)
        .one(db)
        .await?
        .ok_or_else(|| RepoError::not_found(ENTITY, id))
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewProject) -> RepoResult<project::Model> {
    new.validate()?;

    let display_order = match new.display_order {
        Some(n) => n,
        None => next_display_order(db, Entity::find()).await?,
    };

    let now = Utc::now();
    let model = project::ActiveModel {
        title: Set(new.title.unwrap_or_default().trim().to_string()),
        description: Set(new.description),
        technologies: Set(new.technologies),
        github_url: Set(new.github_url),
        live_url: Set(new.live_url),
        image_url: Set(new.image_url),
        display_order: Set(display_order),
        is_active: Set(new.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created project {} '{}'", model.id, model.title);
    Ok(model)
}

pub async fn update<C: ConnectionTrait>(db: &C, id: i32, patch: ProjectPatch) -> RepoResult<project::Model> {
    patch.validate()?;

    let existing = get(db, id, Visibility::All).await?;
    let mut model: project::ActiveModel = existing.into();
    merge(&mut model.title, patch.title.map(|t| t.trim().to_string()));
    merge(&mut model.description, patch.description);
    merge(&mut model.technologies, patch.technologies);
    merge(&mut model.github_url, patch.github_url);
    merge(&mut model.live_url, patch.live_url);
    merge(&mut model.image_url, patch.image_url);
    merge(&mut model.display_order, patch.display_order);
    merge(&mut model.is_active, patch.is_active);
    model.updated_at = Set(Utc::now());

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

    info!("Deleted project {id}");
    Ok(())
}
