use thiserror::Error;

#[derive(Debug, Error)]
pub enum FolioError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{field} {reason}")]
    Validation { field: String, reason: String },
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: Option<i32> },
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("File type not allowed: {0}")]
    UnsupportedType(String),
    #[error("No file was uploaded")]
    EmptyUpload,
    #[error("Could not hash password: {0}")]
    PasswordHash(String),
}

impl FolioError {
    /// Shorthand for the common "field is required" validation failure.
    pub fn required(field: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: "is required".to_string(),
        }
    }

    pub fn invalid<R: Into<String>>(field: &str, reason: R) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound {
            entity,
            id: Some(id),
        }
    }

    /// True for errors caused by the caller rather than by the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::PasswordHash(_))
    }
}
