//! Request payloads for every piece of editable content.
//!
//! Each entity has a `New*` struct used on creation and a `*Patch` struct
//! used on update. The patch structs are the complete list of fields a client
//! may change; anything else in a request body is ignored. In a patch an
//! absent field means "keep the current value". Nullable fields use
//! [`Patch`] so that an explicit `null` can be told apart from absence and
//! clears the stored value.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::{dates::parse_optional_project_date, error::FolioError};

/// `None` = field absent, `Some(None)` = explicit null, `Some(Some(v))` = set.
pub type Patch<T> = Option<Option<T>>;

/// Deserializer for [`Patch`] fields. Must be paired with `#[serde(default)]`
/// so that absence maps to the outer `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn require_text(field: &str, value: &Option<String>) -> Result<(), FolioError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(FolioError::required(field)),
    }
}

fn check_text_patch(field: &str, value: &Option<String>) -> Result<(), FolioError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(FolioError::invalid(field, "must not be empty")),
        _ => Ok(()),
    }
}

fn check_order(value: Option<i32>) -> Result<(), FolioError> {
    match value {
        Some(n) if n < 0 => Err(FolioError::invalid("display_order", "must not be negative")),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Projects

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl NewProject {
    pub fn validate(&self) -> Result<(), FolioError> {
        require_text("title", &self.title)?;
        check_order(self.display_order)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub technologies: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub github_url: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub live_url: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Patch<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), FolioError> {
        check_text_patch("title", &self.title)?;
        check_order(self.display_order)
    }
}

// ---------------------------------------------------------------------------
// Web links

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLink {
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl NewLink {
    pub fn validate(&self) -> Result<(), FolioError> {
        require_text("title", &self.title)?;
        require_text("url", &self.url)?;
        check_order(self.display_order)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Patch<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl LinkPatch {
    pub fn validate(&self) -> Result<(), FolioError> {
        check_text_patch("title", &self.title)?;
        check_text_patch("url", &self.url)?;
        check_order(self.display_order)
    }
}

// ---------------------------------------------------------------------------
// Folders

pub const DEFAULT_FOLDER_ICON: &str = "folder";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFolder {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_type: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl NewFolder {
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), FolioError> {
        require_text("name", &self.name)?;
        check_order(self.display_order)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Patch<String>,
    pub icon_type: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl FolderPatch {
    pub fn validate(&self) -> Result<(), FolioError> {
        check_text_patch("name", &self.name)?;
        check_text_patch("icon_type", &self.icon_type)?;
        check_order(self.display_order)
    }
}

// ---------------------------------------------------------------------------
// Design work

/// Parses a folder reference that may arrive as a JSON number or a string.
pub fn parse_folder_id(value: Option<&serde_json::Value>) -> Result<i32, FolioError> {
    let must_be_int = || FolioError::invalid("folder_id", "must be a valid integer");

    match value {
        None | Some(serde_json::Value::Null) => Err(FolioError::required("folder_id")),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(must_be_int),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            Err(FolioError::required("folder_id"))
        }
        Some(serde_json::Value::String(s)) => s.trim().parse().map_err(|_| must_be_int()),
        Some(_) => Err(must_be_int()),
    }
}

/// The metadata part of a design-work upload. Arrives as multipart text
/// fields alongside the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDesignWork {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub tags: Option<String>,
    pub project_date: Option<NaiveDate>,
    pub display_order: Option<i32>,
    pub is_active: bool,
}

impl NewDesignWork {
    /// Builds the metadata from multipart form fields. Returns the requested
    /// folder id separately because its existence has to be checked before
    /// anything else is validated.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<(i32, Self), FolioError> {
        let folder_id = parse_folder_id(
            fields
                .get("folder_id")
                .map(|v| serde_json::Value::String(v.clone()))
                .as_ref(),
        )?;

        let text = |name: &str| {
            fields
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let display_order = match text("display_order") {
            Some(v) => Some(
                v.parse::<i32>()
                    .map_err(|_| FolioError::invalid("display_order", "must be a valid integer"))?,
            ),
            None => None,
        };

        let work = Self {
            title: text("title"),
            description: text("description"),
            client_name: text("client_name"),
            tags: text("tags"),
            project_date: parse_optional_project_date(fields.get("project_date").map(String::as_str))?,
            display_order,
            is_active: text("is_active")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
        };

        Ok((folder_id, work))
    }

    /// A bulk-upload item: titled after its file, everything else default.
    pub fn titled<S: Into<String>>(title: S) -> Self {
        Self {
            title: Some(title.into()),
            is_active: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), FolioError> {
        require_text("title", &self.title)?;
        check_order(self.display_order)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesignWorkPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Patch<serde_json::Value>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub client_name: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_date: Patch<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl DesignWorkPatch {
    pub fn validate(&self) -> Result<(), FolioError> {
        self.folder_id()?;
        self.project_date()?;
        check_text_patch("title", &self.title)?;
        check_order(self.display_order)
    }

    /// The folder the item should move to, if the patch names one.
    pub fn folder_id(&self) -> Result<Option<i32>, FolioError> {
        match &self.folder_id {
            None => Ok(None),
            Some(value) => parse_folder_id(value.as_ref()).map(Some),
        }
    }

    /// The parsed project date change, if the patch names one.
    pub fn project_date(&self) -> Result<Patch<NaiveDate>, FolioError> {
        match &self.project_date {
            None => Ok(None),
            Some(value) => parse_optional_project_date(value.as_deref()).map(Some),
        }
    }
}

// ---------------------------------------------------------------------------
// Singletons

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub skills: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub resume_pdf_url: Patch<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub pc_name: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub welcome_title: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub browser_tab_title: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub owner_name: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub owner_email: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub github_url: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub linkedin_url: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub about_intro: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub about_why_site: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub about_interests: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub about_interests2: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub about_interests3: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub boot_screen_line1: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub boot_screen_line2: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub boot_screen_copyright: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_image_1: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_image_2: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_image_3: Patch<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_image_4: Patch<String>,
}

/// Validates a profile image slot number, which must be 1 to 4.
pub fn parse_profile_slot(value: Option<&str>) -> Result<u8, FolioError> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("1");
    match value.parse::<u8>() {
        Ok(slot @ 1..=4) => Ok(slot),
        _ => Err(FolioError::invalid("slot", "must be 1, 2, 3 or 4")),
    }
}

// ---------------------------------------------------------------------------
// Misc

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// A message from the contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailMessage {
    pub from: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl EmailMessage {
    pub fn validate(&self) -> Result<(), FolioError> {
        require_text("from", &self.from)?;
        require_text("subject", &self.subject)?;
        require_text("message", &self.message)
    }
}
