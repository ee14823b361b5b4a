//! Integration tests for the script repository, including the
//! create-from-video and clone transactions.

use innovate_core::script::{ScriptStatus, ScriptView};
use innovate_core::types::{new_id, DbId};
use innovate_db::models::script::{CreateScript, CreateScriptFromVideo, UpdateScript};
use innovate_db::models::user::CreateUser;
use innovate_db::models::video::CreateVideo;
use innovate_db::repositories::{DashboardRepo, ScriptRepo, UserRepo, VideoRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_video(pool: &PgPool, user_id: DbId) -> DbId {
    let id = new_id();
    VideoRepo::create(
        pool,
        &CreateVideo {
            id,
            user_id,
            title: "clip".into(),
            description: None,
            file_name: "clip.mp4".into(),
            file_path: format!("{user_id}/{id}/1-clip.mp4"),
            storage_url: format!("http://store/videos/{user_id}/{id}/1-clip.mp4"),
            file_size: 2048,
            mime_type: "video/mp4".into(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_script(user_id: DbId, title: &str) -> CreateScript {
    CreateScript {
        user_id,
        video_id: None,
        title: title.to_string(),
        description: Some("opens finder".into()),
        script: "tell application \"Finder\" to activate".into(),
        status: None,
        tags: vec!["finder".into()],
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_defaults(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let script = ScriptRepo::create(&pool, &new_script(user, "Open Finder"))
        .await
        .unwrap();

    assert_eq!(script.status, ScriptStatus::Draft);
    assert!(!script.is_favorite);
    assert_eq!(script.execution_count, 0);
    assert_eq!(script.last_executed_at, None);
    assert_eq!(script.tags, vec!["finder".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_title_violates_check(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let err = ScriptRepo::create(&pool, &new_script(user, "   "))
        .await
        .unwrap_err();
    let db = err.as_database_error().unwrap();
    assert_eq!(db.constraint(), Some("ck_scripts_title"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_applies_only_given_fields(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let video = new_video(&pool, user).await;
    let mut input = new_script(user, "Original");
    input.video_id = Some(video);
    let script = ScriptRepo::create(&pool, &input).await.unwrap();

    let updated = ScriptRepo::update(
        &pool,
        script.id,
        &UpdateScript {
            title: Some("Renamed".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.script, script.script);
    assert_eq!(updated.video_id, Some(video));

    let unlinked = ScriptRepo::update(
        &pool,
        script.id,
        &UpdateScript {
            video_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(unlinked.video_id, None);
    assert_eq!(unlinked.title, "Renamed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_can_clear_description(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let mut input = new_script(user, "Described");
    input.description = Some("first draft".into());
    let script = ScriptRepo::create(&pool, &input).await.unwrap();

    let kept = ScriptRepo::update(&pool, script.id, &UpdateScript::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.description.as_deref(), Some("first draft"));

    let cleared = ScriptRepo::update(
        &pool,
        script.id,
        &UpdateScript {
            description: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.title, "Described");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn favorite_round_trips(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let script = ScriptRepo::create(&pool, &new_script(user, "Fav")).await.unwrap();

    let off = ScriptRepo::set_favorite(&pool, script.id, false).await.unwrap().unwrap();
    assert!(!off.is_favorite);
    let on = ScriptRepo::set_favorite(&pool, script.id, true).await.unwrap().unwrap();
    assert!(on.is_favorite);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn increment_counts_exactly(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let script = ScriptRepo::create(&pool, &new_script(user, "Run me")).await.unwrap();

    let mut last = 0;
    for _ in 0..5 {
        let row = ScriptRepo::increment_execution_count(&pool, script.id)
            .await
            .unwrap()
            .unwrap();
        assert!(row.execution_count > last);
        last = row.execution_count;
    }
    assert_eq!(last, 5);

    let row = ScriptRepo::find_by_id(&pool, script.id).await.unwrap().unwrap();
    assert!(row.last_executed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_increments_are_not_lost(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let script = ScriptRepo::create(&pool, &new_script(user, "Hot")).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                ScriptRepo::increment_execution_count(&pool, script.id)
                    .await
                    .unwrap()
            })
        })
        .collect();
    for h in handles {
        h.await.unwrap();
    }

    let row = ScriptRepo::find_by_id(&pool, script.id).await.unwrap().unwrap();
    assert_eq!(row.execution_count, 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_from_lists(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let script = ScriptRepo::create(&pool, &new_script(user, "Gone")).await.unwrap();

    assert!(ScriptRepo::delete(&pool, script.id).await.unwrap());
    assert!(!ScriptRepo::delete(&pool, script.id).await.unwrap());
    let scripts = ScriptRepo::list_by_user(&pool, user, ScriptView::All).await.unwrap();
    assert!(scripts.is_empty());
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_views_filter(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let other = new_user(&pool, "b@example.com").await;

    let draft = ScriptRepo::create(&pool, &new_script(user, "Draft")).await.unwrap();
    let mut done = new_script(user, "Done");
    done.status = Some(ScriptStatus::Completed);
    let done = ScriptRepo::create(&pool, &done).await.unwrap();
    ScriptRepo::set_favorite(&pool, draft.id, true).await.unwrap();
    ScriptRepo::create(&pool, &new_script(other, "Not mine")).await.unwrap();

    let all = ScriptRepo::list_by_user(&pool, user, ScriptView::All).await.unwrap();
    assert_eq!(all.iter().map(|s| s.id).collect::<Vec<_>>(), vec![done.id, draft.id]);

    let favorites = ScriptRepo::list_by_user(&pool, user, ScriptView::Favorites).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, draft.id);

    let completed = ScriptRepo::list_by_user(&pool, user, ScriptView::Completed).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);

    let drafts = ScriptRepo::list_by_user(&pool, user, ScriptView::Draft).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, draft.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recent_view_is_limited(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    for i in 0..7 {
        ScriptRepo::create(&pool, &new_script(user, &format!("S{i}")))
            .await
            .unwrap();
    }
    let recent = ScriptRepo::list_by_user(&pool, user, ScriptView::Recent).await.unwrap();
    assert_eq!(recent.len(), 5);
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_from_video_copies_owner(pool: PgPool) {
    let owner = new_user(&pool, "owner@example.com").await;
    let video = new_video(&pool, owner).await;

    let id = ScriptRepo::create_from_video(
        &pool,
        video,
        &CreateScriptFromVideo {
            title: "From video".into(),
            script: "display dialog \"hi\"".into(),
            description: None,
            tags: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    let script = ScriptRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(script.user_id, owner);
    assert_eq!(script.video_id, Some(video));
    assert_eq!(script.status, ScriptStatus::Completed);
    assert!(script.tags.is_empty());

    let listed = ScriptRepo::list_by_video(&pool, video).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_from_missing_video_is_none(pool: PgPool) {
    let result = ScriptRepo::create_from_video(
        &pool,
        new_id(),
        &CreateScriptFromVideo {
            title: "x".into(),
            script: "y".into(),
            description: None,
            tags: None,
        },
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clone_resets_counters(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let video = new_video(&pool, user).await;
    let mut input = new_script(user, "Backup");
    input.video_id = Some(video);
    input.status = Some(ScriptStatus::Completed);
    let source = ScriptRepo::create(&pool, &input).await.unwrap();
    ScriptRepo::set_favorite(&pool, source.id, true).await.unwrap();
    ScriptRepo::increment_execution_count(&pool, source.id).await.unwrap();

    let clone_id = ScriptRepo::clone(&pool, source.id, None).await.unwrap().unwrap();
    let clone = ScriptRepo::find_by_id(&pool, clone_id).await.unwrap().unwrap();

    assert_ne!(clone.id, source.id);
    assert_eq!(clone.title, "Backup (Copy)");
    assert_eq!(clone.user_id, user);
    assert_eq!(clone.video_id, Some(video));
    assert_eq!(clone.script, source.script);
    assert_eq!(clone.status, ScriptStatus::Completed);
    assert_eq!(clone.tags, source.tags);
    assert!(!clone.is_favorite);
    assert_eq!(clone.execution_count, 0);
    assert_eq!(clone.last_executed_at, None);

    let named = ScriptRepo::clone(&pool, source.id, Some("Nightly")).await.unwrap().unwrap();
    let named = ScriptRepo::find_by_id(&pool, named).await.unwrap().unwrap();
    assert_eq!(named.title, "Nightly");

    assert!(ScriptRepo::clone(&pool, new_id(), None).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_video_unlinks_scripts(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    let video = new_video(&pool, user).await;
    let mut input = new_script(user, "Linked");
    input.video_id = Some(video);
    let script = ScriptRepo::create(&pool, &input).await.unwrap();

    VideoRepo::delete(&pool, video).await.unwrap();
    let script = ScriptRepo::find_by_id(&pool, script.id).await.unwrap().unwrap();
    assert_eq!(script.video_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_stats_aggregate(pool: PgPool) {
    let user = new_user(&pool, "a@example.com").await;
    new_video(&pool, user).await;
    new_video(&pool, user).await;
    let script = ScriptRepo::create(&pool, &new_script(user, "S")).await.unwrap();
    ScriptRepo::set_favorite(&pool, script.id, true).await.unwrap();
    ScriptRepo::increment_execution_count(&pool, script.id).await.unwrap();
    ScriptRepo::increment_execution_count(&pool, script.id).await.unwrap();

    let stats = DashboardRepo::stats_for_user(&pool, user).await.unwrap();
    assert_eq!(stats.video_count, 2);
    assert_eq!(stats.total_bytes, 4096);
    assert_eq!(stats.total_duration, 0.0);
    assert_eq!(stats.script_count, 1);
    assert_eq!(stats.favorite_count, 1);
    assert_eq!(stats.total_executions, 2);

    let empty = DashboardRepo::stats_for_user(&pool, new_id()).await.unwrap();
    assert_eq!(empty.video_count, 0);
}
