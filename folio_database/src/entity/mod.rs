pub mod design_work;
pub mod folder;
pub mod project;
pub mod resume_info;
pub mod site_settings;
pub mod user;
pub mod web_link;

/// Primary key of the one row kept in each singleton table.
pub const SINGLETON_ID: i32 = 1;
