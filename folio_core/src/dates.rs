use chrono::{DateTime, NaiveDate};

use crate::error::FolioError;

/// Parses a project date supplied by a client. Accepts either a plain date
/// ("2024-09-01") or a full RFC 3339 timestamp ("2024-09-01T05:10:44Z"), in
/// which case only the date part is kept.
pub fn parse_project_date(value: &str) -> Result<NaiveDate, FolioError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| FolioError::invalid("project_date", format!("'{value}' is not a valid date")))
}

/// Like [`parse_project_date`] but treats an empty string as "no date".
pub fn parse_optional_project_date(value: Option<&str>) -> Result<Option<NaiveDate>, FolioError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_project_date(v).map(Some),
    }
}
