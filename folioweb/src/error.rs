use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_core::FolioError;
use folio_database::RepoError;
use serde_json::json;
use tracing::error;

/// The error every handler returns. Rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    code: StatusCode,
    message: Option<String>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.message.unwrap_or_else(|| {
            self.code
                .canonical_reason()
                .unwrap_or("Error")
                .to_string()
        });

        (self.code, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StatusCode> for ApiError {
    fn from(code: StatusCode) -> Self {
        Self { code, message: None }
    }
}

impl ApiError {
    /// Sets the message on the error.
    pub fn message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Self::from(StatusCode::BAD_REQUEST).message(msg)
    }

    pub fn not_found() -> Self {
        Self::from(StatusCode::NOT_FOUND).message("Not found")
    }

    pub fn unauthorized() -> Self {
        Self::from(StatusCode::UNAUTHORIZED).message(FolioError::Unauthorized.to_string())
    }

    /// Logs `err` and hides it behind a generic message.
    pub fn server_error<E: std::fmt::Display>(err: E) -> Self {
        error!("Internal error: {err}");
        Self::from(StatusCode::INTERNAL_SERVER_ERROR).message("Internal server error")
    }
}

impl From<FolioError> for ApiError {
    fn from(err: FolioError) -> Self {
        let code = match &err {
            FolioError::Validation { .. } | FolioError::UnsupportedType(_) | FolioError::EmptyUpload => {
                StatusCode::BAD_REQUEST
            }
            FolioError::NotFound { .. } => StatusCode::NOT_FOUND,
            FolioError::Unauthorized | FolioError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            FolioError::Io(_) | FolioError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if code.is_server_error() {
            Self::server_error(err)
        } else {
            Self::from(code).message(err.to_string())
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Folio(err) => err.into(),
            RepoError::Db(err) => Self::server_error(err),
        }
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::server_error(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        // `/api/projects/abc` names no project.
        tracing::debug!("Path rejected: {}", rejection.body_text());
        Self::not_found()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::from(rejection.status()).message(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // Carries 413 when the body limit was hit.
        Self::from(err.status()).message(err.body_text())
    }
}
