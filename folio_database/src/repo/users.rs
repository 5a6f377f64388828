use chrono::Utc;
use folio_core::{
    auth::{hash_password, verify_against_dummy, verify_password},
    FolioError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};

use super::{RepoError, RepoResult};
use crate::entity::user::{self, Column, Entity};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> RepoResult<Option<user::Model>> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> RepoResult<Option<user::Model>> {
    Ok(Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await?)
}

/// Checks a username and password. Usernames are matched exactly. Every
/// failure, whichever half was wrong, is reported as `InvalidCredentials`.
pub async fn authenticate<C: ConnectionTrait>(db: &C, username: &str, password: &str) -> RepoResult<user::Model> {
    match find_by_username(db, username).await? {
        Some(user) => {
            if verify_password(password, &user.password_hash)? {
                info!("User {} logged in", user.username);
                Ok(user)
            } else {
                warn!("Failed login for {username:?}");
                Err(FolioError::InvalidCredentials.into())
            }
        }
        None => {
            verify_against_dummy(password);
            warn!("Failed login for unknown user {username:?}");
            Err(FolioError::InvalidCredentials.into())
        }
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, username: &str, email: &str, password: &str) -> RepoResult<user::Model> {
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() {
        return Err(FolioError::required("username").into());
    }
    if !email.contains('@') {
        return Err(FolioError::invalid("email", "is not an email address").into());
    }
    check_password(password)?;

    if find_by_username(db, username).await?.is_some() {
        return Err(FolioError::invalid("username", "is already taken").into());
    }
    if Entity::find().filter(Column::Email.eq(email)).one(db).await?.is_some() {
        return Err(FolioError::invalid("email", "is already taken").into());
    }

    let model = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created user {} ({})", model.username, model.id);
    Ok(model)
}

pub async fn set_password<C: ConnectionTrait>(db: &C, username: &str, password: &str) -> RepoResult<user::Model> {
    check_password(password)?;

    let user = find_by_username(db, username).await?.ok_or(FolioError::NotFound {
        entity: "User",
        id: None,
    })?;

    let mut model: user::ActiveModel = user.into();
    model.password_hash = Set(hash_password(password)?);
    let model = model.update(db).await?;

    info!("Changed password for {}", model.username);
    Ok(model)
}

/// Creates the bootstrap account unless a user with that name already
/// exists. Returns true if it was created.
pub async fn ensure_user<C: ConnectionTrait>(db: &C, username: &str, email: &str, password: &str) -> RepoResult<bool> {
    if find_by_username(db, username).await?.is_some() {
        return Ok(false);
    }

    match create(db, username, email, password).await {
        Ok(_) => Ok(true),
        // Someone else created it in the meantime.
        Err(err @ RepoError::Folio(FolioError::Validation { .. })) => {
            if find_by_username(db, username).await?.is_some() {
                Ok(false)
            } else {
                Err(err)
            }
        }
        Err(err) => Err(err),
    }
}

fn check_password(password: &str) -> Result<(), FolioError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        Err(FolioError::invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ))
    } else {
        Ok(())
    }
}
