//! All reads and writes of content go through the functions in these
//! modules. They enforce the ordering rule (display order, then newest
//! first), partial-update semantics, and keep files in the upload directory
//! in step with the rows that reference them.

use folio_core::FolioError;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Select};
use thiserror::Error;

pub mod design_work;
pub mod folders;
pub mod links;
pub mod projects;
pub mod singletons;
pub mod users;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Folio(#[from] FolioError),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::Folio(FolioError::not_found(entity, id))
    }
}

/// Which rows a listing may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only rows with `is_active` set; what anonymous visitors see.
    Public,
    /// Everything, for the admin.
    All,
}

impl Visibility {
    fn apply<E, C>(self, select: Select<E>, is_active: C) -> Select<E>
    where
        E: EntityTrait,
        C: ColumnTrait,
    {
        match self {
            Visibility::Public => select.filter(is_active.eq(true)),
            Visibility::All => select,
        }
    }
}

/// The order a new row gets when the client does not choose one: after all
/// of its existing siblings.
async fn next_display_order<E, C>(db: &C, siblings: Select<E>) -> RepoResult<i32>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    let count = siblings.count(db).await?;
    Ok(i32::try_from(count).unwrap_or(i32::MAX))
}

/// Replaces `target` when the patch carries a value.
fn merge<T>(target: &mut sea_orm::ActiveValue<T>, value: Option<T>)
where
    T: Into<sea_orm::Value>,
{
    if let Some(value) = value {
        *target = sea_orm::Set(value);
    }
}
