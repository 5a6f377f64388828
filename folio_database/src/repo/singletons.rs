//! The résumé and the site settings each live in a single row with a fixed
//! id. The row is created with default content the first time anyone asks
//! for it. Creation is an insert that ignores a conflicting id, so two
//! requests racing to create it still leave exactly one row.

use chrono::Utc;
use folio_core::{
    content::{ResumePatch, SettingsPatch},
    media::MediaStore,
    FolioError,
};
use sea_orm::{sea_query::OnConflict, ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};
use tracing::{debug, info};

use super::{merge, RepoResult};
use crate::entity::{resume_info, site_settings, SINGLETON_ID};

pub async fn resume<C: ConnectionTrait>(db: &C) -> RepoResult<resume_info::Model> {
    if let Some(model) = resume_info::Entity::find_by_id(SINGLETON_ID).one(db).await? {
        return Ok(model);
    }

    let inserted = resume_info::Entity::insert(resume_info::ActiveModel::defaults())
        .on_conflict(OnConflict::column(resume_info::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    debug!("Created résumé row: {}", inserted > 0);

    resume_info::Entity::find_by_id(SINGLETON_ID)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("resume_info".to_string()).into())
}

pub async fn update_resume<C: ConnectionTrait>(db: &C, patch: ResumePatch) -> RepoResult<resume_info::Model> {
    let mut model: resume_info::ActiveModel = resume(db).await?.into();
    merge(&mut model.full_name, patch.full_name);
    merge(&mut model.title, patch.title);
    merge(&mut model.email, patch.email);
    merge(&mut model.phone, patch.phone);
    merge(&mut model.location, patch.location);
    merge(&mut model.summary, patch.summary);
    merge(&mut model.skills, patch.skills);
    merge(&mut model.resume_pdf_url, patch.resume_pdf_url);
    model.updated_at = Set(Utc::now());

    Ok(model.update(db).await?)
}

pub async fn settings<C: ConnectionTrait>(db: &C) -> RepoResult<site_settings::Model> {
    if let Some(model) = site_settings::Entity::find_by_id(SINGLETON_ID).one(db).await? {
        return Ok(model);
    }

    let inserted = site_settings::Entity::insert(site_settings::ActiveModel::defaults())
        .on_conflict(OnConflict::column(site_settings::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    debug!("Created site settings row: {}", inserted > 0);

    site_settings::Entity::find_by_id(SINGLETON_ID)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("site_settings".to_string()).into())
}

pub async fn update_settings<C: ConnectionTrait>(db: &C, patch: SettingsPatch) -> RepoResult<site_settings::Model> {
    let mut model: site_settings::ActiveModel = settings(db).await?.into();
    merge(&mut model.pc_name, patch.pc_name);
    merge(&mut model.welcome_title, patch.welcome_title);
    merge(&mut model.browser_tab_title, patch.browser_tab_title);
    merge(&mut model.owner_name, patch.owner_name);
    merge(&mut model.owner_email, patch.owner_email);
    merge(&mut model.github_url, patch.github_url);
    merge(&mut model.linkedin_url, patch.linkedin_url);
    merge(&mut model.about_intro, patch.about_intro);
    merge(&mut model.about_why_site, patch.about_why_site);
    merge(&mut model.about_interests, patch.about_interests);
    merge(&mut model.about_interests2, patch.about_interests2);
    merge(&mut model.about_interests3, patch.about_interests3);
    merge(&mut model.boot_screen_line1, patch.boot_screen_line1);
    merge(&mut model.boot_screen_line2, patch.boot_screen_line2);
    merge(&mut model.boot_screen_copyright, patch.boot_screen_copyright);
    merge(&mut model.profile_image_1, patch.profile_image_1);
    merge(&mut model.profile_image_2, patch.profile_image_2);
    merge(&mut model.profile_image_3, patch.profile_image_3);
    merge(&mut model.profile_image_4, patch.profile_image_4);
    model.updated_at = Set(Utc::now());

    Ok(model.update(db).await?)
}

/// Points profile image `slot` (1 to 4) at `file_url`. The file previously
/// in that slot, if it was one of ours, is removed.
pub async fn set_profile_image<C: ConnectionTrait>(
    db: &C,
    media: &MediaStore,
    slot: u8,
    file_url: String,
) -> RepoResult<site_settings::Model> {
    let current = settings(db).await?;
    let mut model: site_settings::ActiveModel = current.clone().into();

    let previous = match slot {
        1 => current.profile_image_1,
        2 => current.profile_image_2,
        3 => current.profile_image_3,
        4 => current.profile_image_4,
        _ => return Err(FolioError::invalid("slot", "must be 1, 2, 3 or 4").into()),
    };
    let value = Set(Some(file_url.clone()));
    match slot {
        1 => model.profile_image_1 = value,
        2 => model.profile_image_2 = value,
        3 => model.profile_image_3 = value,
        _ => model.profile_image_4 = value,
    }
    model.updated_at = Set(Utc::now());
    let updated = model.update(db).await?;

    info!("Profile image {slot} is now {file_url}");

    if let Some(previous) = previous.filter(|p| *p != file_url) {
        let mut urls = vec![previous.clone()];
        urls.extend(MediaStore::thumbnail_url_for(&previous));
        media.remove_all(urls).await;
    }

    Ok(updated)
}
