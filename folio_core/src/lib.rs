#![forbid(unsafe_code)]

pub mod auth;
pub mod content;
pub mod dates;
mod error;
pub mod media;

pub use error::FolioError;
