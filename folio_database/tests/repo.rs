use std::{io::Cursor, path::Path};

use folio_core::{
    content::{
        DesignWorkPatch, FolderPatch, LinkPatch, NewDesignWork, NewFolder, NewLink, NewProject, ProjectPatch,
        ResumePatch, SettingsPatch,
    },
    media::{MediaStore, Upload},
    FolioError,
};
use folio_database::{
    entity::{design_work as dw, resume_info, site_settings},
    initialise_database,
    repo::{design_work, folders, links, projects, singletons, users},
    sqlite_url, RepoError, Visibility,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::json;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    db: DatabaseConnection,
    media: MediaStore,
}

async fn setup() -> Fixture {
    let dir = TempDir::new().unwrap();
    let db = initialise_database(&sqlite_url(dir.path().join("db/folio.db")))
        .await
        .unwrap();
    let media = MediaStore::new(dir.path().join("uploads"));
    Fixture { _dir: dir, db, media }
}

fn png(name: &str) -> Upload {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 150, image::Rgb([0, 90, 200])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    Upload::new(name, buf.into_inner())
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

fn is_not_found(result: &Result<impl std::fmt::Debug, RepoError>) -> bool {
    matches!(result, Err(RepoError::Folio(FolioError::NotFound { .. })))
}

fn project(title: &str, order: Option<i32>) -> NewProject {
    NewProject {
        title: Some(title.to_string()),
        display_order: order,
        ..Default::default()
    }
}

#[tokio::test]
async fn projects_are_listed_by_order_then_newest() {
    let f = setup().await;

    projects::create(&f.db, project("B", Some(1))).await.unwrap();
    projects::create(&f.db, project("A", Some(1))).await.unwrap();
    projects::create(&f.db, project("C", Some(0))).await.unwrap();

    let titles: Vec<_> = projects::list(&f.db, Visibility::All)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, ["C", "A", "B"]);
}

#[tokio::test]
async fn default_order_is_the_sibling_count() {
    let f = setup().await;

    let first = projects::create(&f.db, project("one", None)).await.unwrap();
    let second = projects::create(&f.db, project("two", None)).await.unwrap();
    assert_eq!(first.display_order, 0);
    assert_eq!(second.display_order, 1);
}

async fn project_titles(f: &Fixture) -> Vec<String> {
    projects::list(&f.db, Visibility::All)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect()
}

#[tokio::test]
async fn lowering_an_order_moves_the_item_up() {
    let f = setup().await;

    let one = projects::create(&f.db, project("one", None)).await.unwrap();
    let two = projects::create(&f.db, project("two", None)).await.unwrap();
    projects::create(&f.db, project("three", None)).await.unwrap();
    assert_eq!(project_titles(&f).await, ["one", "two", "three"]);

    // Equal orders fall back to newest first, so "two" now leads.
    let patch = ProjectPatch {
        display_order: Some(one.display_order),
        ..Default::default()
    };
    let moved = projects::update(&f.db, two.id, patch).await.unwrap();
    assert_eq!(moved.display_order, 0);

    assert_eq!(project_titles(&f).await, ["two", "one", "three"]);
}

#[tokio::test]
async fn partial_update_leaves_other_fields_alone() {
    let f = setup().await;

    let created = projects::create(
        &f.db,
        NewProject {
            title: Some("Folio".into()),
            description: Some("A portfolio".into()),
            github_url: Some("https://github.com/me/folio".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let patch: ProjectPatch = serde_json::from_value(json!({
        "description": null,
        "is_active": false
    }))
    .unwrap();
    let updated = projects::update(&f.db, created.id, patch).await.unwrap();

    assert_eq!(updated.title, "Folio");
    assert_eq!(updated.description, None);
    assert_eq!(updated.github_url, created.github_url);
    assert!(!updated.is_active);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn inactive_projects_are_hidden_from_the_public() {
    let f = setup().await;

    let mut hidden = project("Hidden", None);
    hidden.is_active = Some(false);
    let hidden = projects::create(&f.db, hidden).await.unwrap();
    projects::create(&f.db, project("Shown", None)).await.unwrap();

    assert_eq!(projects::list(&f.db, Visibility::Public).await.unwrap().len(), 1);
    assert_eq!(projects::list(&f.db, Visibility::All).await.unwrap().len(), 2);
    assert!(is_not_found(&projects::get(&f.db, hidden.id, Visibility::Public).await));
    assert!(projects::get(&f.db, hidden.id, Visibility::All).await.is_ok());
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let f = setup().await;

    assert!(is_not_found(&projects::update(&f.db, 42, ProjectPatch::default()).await));
    assert!(is_not_found(&projects::delete(&f.db, 42).await));
    assert!(is_not_found(&folders::delete(&f.db, &f.media, 42).await));
    assert!(is_not_found(&design_work::delete(&f.db, &f.media, 42).await));
}

#[tokio::test]
async fn design_work_upload_records_image_metadata() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Logos")).await.unwrap();

    let item = design_work::create(&f.db, &f.media, folder.id, NewDesignWork::titled("Mark"), png("mark.PNG"))
        .await
        .unwrap();

    assert_eq!(item.folder_id, folder.id);
    assert_eq!(item.width, Some(300));
    assert_eq!(item.height, Some(150));
    assert_eq!(item.file_type.as_deref(), Some("png"));
    assert!(item.file_url.starts_with("/admin/uploads/design_"));
    assert!(item.thumbnail_url.is_some());
    assert!(f.media.path_for_url(&item.file_url).unwrap().exists());
}

#[tokio::test]
async fn upload_into_missing_folder_writes_nothing() {
    let f = setup().await;

    let result = design_work::create(&f.db, &f.media, 99, NewDesignWork::titled("x"), png("x.png")).await;
    assert!(is_not_found(&result));
    assert_eq!(file_count(f.media.upload_dir()), 0);
}

#[tokio::test]
async fn disallowed_file_type_writes_nothing() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Docs")).await.unwrap();

    let result = design_work::create(
        &f.db,
        &f.media,
        folder.id,
        NewDesignWork::titled("notes"),
        Upload::new("notes.pdf", b"%PDF-1.4".to_vec()),
    )
    .await;

    assert!(matches!(result, Err(RepoError::Folio(FolioError::UnsupportedType(_)))));
    assert_eq!(file_count(f.media.upload_dir()), 0);
    assert_eq!(dw::Entity::find().count(&f.db).await.unwrap(), 0);
}

#[tokio::test]
async fn bulk_upload_titles_items_after_their_files() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Posters")).await.unwrap();

    let items = design_work::create_many(&f.db, &f.media, folder.id, vec![png("spring.png"), png("autumn.png")])
        .await
        .unwrap();

    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["spring", "autumn"]);
    assert_eq!(items[1].display_order, 1);
}

#[tokio::test]
async fn folder_delete_cascades_to_items_and_files() {
    let f = setup().await;
    let doomed = folders::create(&f.db, NewFolder::named("Old")).await.unwrap();
    let kept = folders::create(&f.db, NewFolder::named("New")).await.unwrap();

    for name in ["a.png", "b.png"] {
        design_work::create(&f.db, &f.media, doomed.id, NewDesignWork::titled(name), png(name))
            .await
            .unwrap();
    }
    let survivor = design_work::create(&f.db, &f.media, kept.id, NewDesignWork::titled("c"), png("c.png"))
        .await
        .unwrap();

    folders::delete(&f.db, &f.media, doomed.id).await.unwrap();

    let remaining = design_work::list(&f.db, None, Visibility::All).await.unwrap();
    assert_eq!(remaining, vec![survivor.clone()]);
    // Only the survivor's file and thumbnail are left.
    assert_eq!(file_count(f.media.upload_dir()), 2);
    assert!(is_not_found(&folders::get(&f.db, doomed.id, Visibility::All).await));
}

#[tokio::test]
async fn folder_listing_counts_items() {
    let f = setup().await;
    let logos = folders::create(&f.db, NewFolder::named("Logos")).await.unwrap();
    let empty = folders::create(&f.db, NewFolder::named("Empty")).await.unwrap();
    assert_eq!(logos.icon_type, "folder");

    let mut hidden = NewDesignWork::titled("draft");
    hidden.is_active = false;
    design_work::create(&f.db, &f.media, logos.id, NewDesignWork::titled("x"), png("x.png"))
        .await
        .unwrap();
    design_work::create(&f.db, &f.media, logos.id, hidden, png("draft.png"))
        .await
        .unwrap();

    let public = folders::list(&f.db, Visibility::Public).await.unwrap();
    let count_of = |id: i32| public.iter().find(|s| s.folder.id == id).unwrap().item_count;
    assert_eq!(count_of(logos.id), 1);
    assert_eq!(count_of(empty.id), 0);

    // Admins see every folder, but the count is still of active items only.
    let all = folders::list(&f.db, Visibility::All).await.unwrap();
    assert_eq!(all.iter().find(|s| s.folder.id == logos.id).unwrap().item_count, 1);
    assert_eq!(folders::get_summary(&f.db, logos.id, Visibility::All).await.unwrap().item_count, 1);
}

#[tokio::test]
async fn folder_with_only_inactive_items_counts_zero() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Drafts")).await.unwrap();

    let mut draft = NewDesignWork::titled("draft");
    draft.is_active = false;
    design_work::create(&f.db, &f.media, folder.id, draft, png("draft.png"))
        .await
        .unwrap();

    for visibility in [Visibility::Public, Visibility::All] {
        let summary = folders::get_summary(&f.db, folder.id, visibility).await.unwrap();
        assert_eq!(summary.item_count, 0);
    }
}

#[tokio::test]
async fn inactive_folder_is_missing_publicly() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Secret")).await.unwrap();
    let patch = FolderPatch {
        is_active: Some(false),
        ..Default::default()
    };
    folders::update(&f.db, folder.id, patch).await.unwrap();

    assert!(is_not_found(&design_work::list_public_folder(&f.db, folder.id).await));
}

#[tokio::test]
async fn moving_an_item_requires_the_target_folder() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("A")).await.unwrap();
    let other = folders::create(&f.db, NewFolder::named("B")).await.unwrap();
    let item = design_work::create(&f.db, &f.media, folder.id, NewDesignWork::titled("x"), png("x.png"))
        .await
        .unwrap();

    let bad: DesignWorkPatch = serde_json::from_value(json!({ "folder_id": 1000 })).unwrap();
    assert!(is_not_found(&design_work::update(&f.db, item.id, bad).await));

    let good: DesignWorkPatch = serde_json::from_value(json!({
        "folder_id": other.id.to_string(),
        "project_date": "2024-05-06",
        "tags": "brand, logo"
    }))
    .unwrap();
    let moved = design_work::update(&f.db, item.id, good).await.unwrap();
    assert_eq!(moved.folder_id, other.id);
    assert_eq!(moved.project_date.unwrap().to_string(), "2024-05-06");
    assert_eq!(moved.file_url, item.file_url);
}

#[tokio::test]
async fn deleting_an_item_removes_its_files() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("A")).await.unwrap();
    let item = design_work::create(&f.db, &f.media, folder.id, NewDesignWork::titled("x"), png("x.png"))
        .await
        .unwrap();
    assert_eq!(file_count(f.media.upload_dir()), 2);

    design_work::delete(&f.db, &f.media, item.id).await.unwrap();
    assert_eq!(file_count(f.media.upload_dir()), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_reads_create_one_settings_row() {
    let f = setup().await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let db = f.db.clone();
            tokio::spawn(async move { singletons::settings(&db).await.unwrap() })
        })
        .collect();
    for task in tasks {
        let settings = task.await.unwrap();
        assert_eq!(settings.id, 1);
    }

    assert_eq!(site_settings::Entity::find().count(&f.db).await.unwrap(), 1);
}

#[tokio::test]
async fn settings_have_defaults_and_accept_patches() {
    let f = setup().await;

    let settings = singletons::settings(&f.db).await.unwrap();
    assert!(settings.welcome_title.is_some());
    assert_eq!(settings.profile_image_1, None);

    let patch: SettingsPatch = serde_json::from_value(json!({
        "owner_name": "Ada",
        "github_url": null
    }))
    .unwrap();
    let updated = singletons::update_settings(&f.db, patch).await.unwrap();
    assert_eq!(updated.owner_name.as_deref(), Some("Ada"));
    assert_eq!(updated.github_url, None);
    assert_eq!(updated.pc_name, settings.pc_name);

    let resume = singletons::resume(&f.db).await.unwrap();
    assert_eq!(resume.full_name, None);
}

#[tokio::test]
async fn replacing_a_profile_image_removes_the_old_file() {
    let f = setup().await;

    let first = f.media.store(png("me.png"), folio_core::media::UploadKind::ProfileImage(2)).await.unwrap();
    singletons::set_profile_image(&f.db, &f.media, 2, first.file_url.clone()).await.unwrap();
    let second = f.media.store(png("me2.png"), folio_core::media::UploadKind::ProfileImage(2)).await.unwrap();
    let settings = singletons::set_profile_image(&f.db, &f.media, 2, second.file_url.clone())
        .await
        .unwrap();

    assert_eq!(settings.profile_image_2, Some(second.file_url.clone()));
    assert!(!f.media.path_for_url(&first.file_url).unwrap().exists());
    assert!(f.media.path_for_url(&second.file_url).unwrap().exists());
}

#[tokio::test]
async fn authentication() {
    let f = setup().await;
    assert!(users::ensure_user(&f.db, "admin", "admin@example.com", "admin123").await.unwrap());
    assert!(!users::ensure_user(&f.db, "admin", "admin@example.com", "admin123").await.unwrap());

    let user = users::authenticate(&f.db, "admin", "admin123").await.unwrap();
    assert_eq!(user.username, "admin");

    for (username, password) in [("admin", "wrong-password"), ("Admin", "admin123"), ("nobody", "admin123")] {
        assert!(matches!(
            users::authenticate(&f.db, username, password).await,
            Err(RepoError::Folio(FolioError::InvalidCredentials))
        ));
    }

    users::set_password(&f.db, "admin", "a-new-password").await.unwrap();
    assert!(users::authenticate(&f.db, "admin", "a-new-password").await.is_ok());
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let f = setup().await;
    assert!(matches!(
        users::create(&f.db, "bob", "bob@example.com", "short").await,
        Err(RepoError::Folio(FolioError::Validation { .. }))
    ));
}

#[tokio::test]
async fn bulk_upload_checks_every_file_before_writing() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Mixed")).await.unwrap();

    let result = design_work::create_many(
        &f.db,
        &f.media,
        folder.id,
        vec![png("good.png"), Upload::new("notes.pdf", b"%PDF-1.4".to_vec())],
    )
    .await;

    assert!(matches!(result, Err(RepoError::Folio(FolioError::UnsupportedType(_)))));
    assert_eq!(file_count(f.media.upload_dir()), 0);
    assert_eq!(dw::Entity::find().count(&f.db).await.unwrap(), 0);
}

#[tokio::test]
async fn bulk_upload_titles_blank_stems_by_filename() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Odd names")).await.unwrap();

    let items = design_work::create_many(&f.db, &f.media, folder.id, vec![png("a.png"), png(" .png")])
        .await
        .unwrap();

    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["a", ".png"]);
    assert_eq!(dw::Entity::find().count(&f.db).await.unwrap(), 2);
}

#[tokio::test]
async fn project_patch_touches_only_the_named_field() {
    let f = setup().await;
    let created = projects::create(
        &f.db,
        NewProject {
            title: Some("Folio".into()),
            description: Some("A portfolio".into()),
            technologies: Some("Rust, SQLite".into()),
            github_url: Some("https://github.com/me/folio".into()),
            live_url: Some("https://folio.example".into()),
            image_url: Some("/admin/uploads/shot.png".into()),
            display_order: Some(3),
            is_active: Some(true),
        },
    )
    .await
    .unwrap();

    let patch: ProjectPatch = serde_json::from_value(json!({ "live_url": "https://new.example" })).unwrap();
    let updated = projects::update(&f.db, created.id, patch).await.unwrap();

    let mut expected = created.clone();
    expected.live_url = Some("https://new.example".into());
    expected.updated_at = updated.updated_at;
    assert_eq!(updated, expected);
}

#[tokio::test]
async fn link_patch_touches_only_the_named_field() {
    let f = setup().await;
    let created = links::create(
        &f.db,
        NewLink {
            title: Some("Blog".into()),
            url: Some("https://blog.example".into()),
            icon: Some("pen".into()),
            display_order: Some(2),
            is_active: Some(false),
        },
    )
    .await
    .unwrap();

    let patch: LinkPatch = serde_json::from_value(json!({ "url": "https://blog.example/new" })).unwrap();
    let updated = links::update(&f.db, created.id, patch).await.unwrap();

    let mut expected = created.clone();
    expected.url = "https://blog.example/new".into();
    assert_eq!(updated, expected);
    assert_eq!(links::get(&f.db, created.id).await.unwrap(), expected);
}

#[tokio::test]
async fn folder_patch_touches_only_the_named_field() {
    let f = setup().await;
    let created = folders::create(
        &f.db,
        NewFolder {
            name: Some("Logos".into()),
            description: Some("Marks and wordmarks".into()),
            icon_type: Some("star".into()),
            display_order: Some(4),
            is_active: Some(true),
        },
    )
    .await
    .unwrap();

    let patch: FolderPatch = serde_json::from_value(json!({ "description": null })).unwrap();
    let updated = folders::update(&f.db, created.id, patch).await.unwrap();

    let mut expected = created.clone();
    expected.description = None;
    expected.updated_at = updated.updated_at;
    assert_eq!(updated, expected);
}

#[tokio::test]
async fn design_work_patch_touches_only_the_named_field() {
    let f = setup().await;
    let folder = folders::create(&f.db, NewFolder::named("Posters")).await.unwrap();
    let work = NewDesignWork {
        title: Some("Spring".into()),
        description: Some("Gig poster".into()),
        client_name: Some("The Band".into()),
        tags: Some("print".into()),
        project_date: Some(chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        display_order: Some(5),
        is_active: true,
    };
    let created = design_work::create(&f.db, &f.media, folder.id, work, png("spring.png"))
        .await
        .unwrap();

    let patch: DesignWorkPatch = serde_json::from_value(json!({ "client_name": "Another Band" })).unwrap();
    let updated = design_work::update(&f.db, created.id, patch).await.unwrap();

    let mut expected = created.clone();
    expected.client_name = Some("Another Band".into());
    expected.updated_at = updated.updated_at;
    assert_eq!(updated, expected);
}

#[tokio::test]
async fn resume_patch_touches_only_the_named_field() {
    let f = setup().await;
    let filled: ResumePatch = serde_json::from_value(json!({
        "full_name": "Ada Lovelace",
        "title": "Analyst",
        "email": "ada@example.com",
        "phone": "555-0100",
        "location": "London",
        "summary": "Notes on the engine",
        "skills": "Mathematics",
        "resume_pdf_url": "/admin/uploads/cv.pdf"
    }))
    .unwrap();
    let before = singletons::update_resume(&f.db, filled).await.unwrap();

    let patch: ResumePatch = serde_json::from_value(json!({ "phone": null })).unwrap();
    let updated = singletons::update_resume(&f.db, patch).await.unwrap();

    let expected = resume_info::Model {
        phone: None,
        updated_at: updated.updated_at,
        ..before
    };
    assert_eq!(updated, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_reads_create_one_resume_row() {
    let f = setup().await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let db = f.db.clone();
            tokio::spawn(async move { singletons::resume(&db).await.unwrap() })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().id, 1);
    }

    assert_eq!(resume_info::Entity::find().count(&f.db).await.unwrap(), 1);
}
