//! Login, logout and the extractors that gate admin routes.
//!
//! The session cookie carries nothing but a signed session id. The session
//! record (in the database) holds the id of the logged-in user under
//! [`USER_ID_KEY`].

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use folio_core::{auth::Identity, content::Credentials};
use folio_database::{
    entity::user::{self, UserSummary},
    repo::users,
};
use serde_json::{json, Value};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    extract::JsonBody,
    AppContext,
};

pub const USER_ID_KEY: &str = "user_id";

/// Who is calling. Never rejects: a missing, expired or unreadable session
/// is simply `Anonymous`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await else {
            return Ok(Self(Identity::Anonymous));
        };

        match session.get::<i32>(USER_ID_KEY).await {
            Ok(Some(user_id)) => Ok(Self(Identity::Authenticated(user_id))),
            Ok(None) => Ok(Self(Identity::Anonymous)),
            Err(err) => {
                warn!("Could not read session: {err}");
                Ok(Self(Identity::Anonymous))
            }
        }
    }
}

/// A caller who is logged in as a user that still exists. Rejects with 401
/// otherwise. Put it before any body extractor so that nothing is read or
/// written for an anonymous caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user: user::Model,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthenticatedIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, ctx).await?;
        let user_id = identity.require()?;

        match users::find_by_id(&ctx.db, user_id).await? {
            Some(user) => Ok(Self { user }),
            None => {
                warn!("Session refers to user {user_id}, who no longer exists");
                Err(ApiError::unauthorized())
            }
        }
    }
}

pub async fn login(
    session: Session,
    State(ctx): State<AppContext>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult<Json<Value>> {
    let user = users::authenticate(&ctx.db, &credentials.username, &credentials.password).await?;

    // A fresh id on every login so that an id planted before login is useless.
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;

    Ok(Json(json!({
        "message": "Logged in successfully",
        "user": UserSummary::from(&user),
    })))
}

/// Ends the session, if there is one.
pub async fn logout(session: Session, CurrentIdentity(identity): CurrentIdentity) -> ApiResult<Json<Value>> {
    session.flush().await?;
    if let Some(user_id) = identity.user_id() {
        info!("User {user_id} logged out");
    }

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(auth: AuthenticatedIdentity) -> Json<UserSummary> {
    Json(UserSummary::from(&auth.user))
}
