use sea_orm::{entity::prelude::*, Set};
use serde::Serialize;

/// Site-wide text and images. Only ever one row, with id
/// [`super::SINGLETON_ID`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pc_name: Option<String>,
    pub welcome_title: Option<String>,
    pub browser_tab_title: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about_intro: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about_why_site: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about_interests: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about_interests2: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub about_interests3: Option<String>,
    pub boot_screen_line1: Option<String>,
    pub boot_screen_line2: Option<String>,
    pub boot_screen_copyright: Option<String>,
    pub profile_image_1: Option<String>,
    pub profile_image_2: Option<String>,
    pub profile_image_3: Option<String>,
    pub profile_image_4: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// The placeholder content shown until the owner edits it.
    pub fn defaults() -> Self {
        let text = |s: &str| Set(Some(s.to_string()));

        Self {
            id: Set(super::SINGLETON_ID),
            pc_name: text("Sujay K's PC"),
            welcome_title: text("Welcome To Sujay K's Personal Website"),
            browser_tab_title: text("Sujay K's Personal Website - Home Page"),
            owner_name: text("Sujay K"),
            owner_email: text("your-email@example.com"),
            github_url: text("https://github.com/yourusername"),
            linkedin_url: text("https://linkedin.com/in/yourusername"),
            about_intro: text("Hi, I'm Sujay K, an aspiring software engineer and entrepreneur..."),
            about_why_site: text("I always love challenging myself to creating something different..."),
            about_interests: Set(None),
            about_interests2: Set(None),
            about_interests3: Set(None),
            boot_screen_line1: Set(None),
            boot_screen_line2: Set(None),
            boot_screen_copyright: Set(None),
            profile_image_1: Set(None),
            profile_image_2: Set(None),
            profile_image_3: Set(None),
            profile_image_4: Set(None),
            updated_at: Set(chrono::Utc::now()),
        }
    }
}
