pub mod admin;
pub mod public;
mod upload;

use crate::error::ApiError;

/// Fallback for unknown paths under `/api` and `/admin`; those never get
/// the frontend's HTML.
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}
