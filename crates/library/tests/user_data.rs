mod common;

use std::time::Duration;

use common::Harness;
use dorama_core::drama::Drama;
use dorama_core::status::WatchStatus;
use dorama_db::local::{FAVORITES_KEY, STATUS_KEY};
use dorama_db::models::LibraryEntry;
use dorama_db::LocalStorage;
use dorama_library::overlay::OverlayMode;

fn drama() -> Drama {
    Drama::new(11, "Our Beloved Summer", &["Romance"])
}

#[tokio::test]
async fn anonymous_status_is_readable_immediately() {
    let h = Harness::new(Vec::new());
    let manager = h.user_data();

    manager.set_status(&drama(), Some(WatchStatus::PlanToWatch)).await;

    assert_eq!(manager.status(&drama()), Some(WatchStatus::PlanToWatch));
    assert!(h.storage.get_item(STATUS_KEY).is_some());
}

#[tokio::test]
async fn authenticated_status_is_readable_before_the_write_resolves() {
    let h = Harness::new(Vec::new());
    let user = h.sign_in().await;
    let manager = h.user_data();
    manager.load_data(Some(&user)).await;

    let d = drama();
    h.backend.pause_writes();
    let write = manager.set_status(&d, Some(WatchStatus::Watching));
    tokio::pin!(write);
    let pending = tokio::time::timeout(Duration::from_millis(50), &mut write).await;
    assert!(pending.is_err(), "write should still be in flight");

    assert_eq!(manager.status(&d), Some(WatchStatus::Watching));
    assert_eq!(h.backend.upsert_count(), 0);

    h.backend.resume_writes();
    write.await;
    assert_eq!(h.backend.upsert_count(), 1);
    assert_eq!(
        h.backend.library_row(user.id, 11).and_then(|r| r.status),
        Some(WatchStatus::Watching)
    );
}

async fn assert_double_toggle_round_trips(manager: &dorama_library::UserDataManager) {
    let d = drama();
    let before = manager.is_favorite(&d);

    let first = manager.toggle_favorite(&d).await;
    assert_eq!(first, !before);
    assert_eq!(manager.is_favorite(&d), first);

    let second = manager.toggle_favorite(&d).await;
    assert_eq!(second, before);
    assert_eq!(manager.is_favorite(&d), before);
}

#[tokio::test]
async fn double_toggle_restores_favorite_anonymously() {
    let h = Harness::new(Vec::new());
    let manager = h.user_data();
    assert_double_toggle_round_trips(&manager).await;
}

#[tokio::test]
async fn double_toggle_restores_favorite_when_signed_in() {
    let h = Harness::new(Vec::new());
    let user = h.sign_in().await;
    let manager = h.user_data();
    manager.load_data(Some(&user)).await;
    assert_eq!(manager.mode(), OverlayMode::Cloud);

    assert_double_toggle_round_trips(&manager).await;
    assert_eq!(h.backend.upsert_count(), 2);
    assert_eq!(h.backend.library_row(user.id, 11).map(|r| r.is_favorite), Some(false));
}

#[tokio::test]
async fn sign_in_replaces_local_data_with_cloud_data() {
    let h = Harness::new(Vec::new());
    let manager = h.user_data();

    manager.set_status(&drama(), Some(WatchStatus::OnHold)).await;
    manager.toggle_favorite(&drama()).await;

    let user = h.sign_in().await;
    h.backend.seed_library(
        user.id,
        LibraryEntry {
            drama_id: 11,
            status: Some(WatchStatus::Watched),
            is_favorite: false,
        },
    );
    manager.load_data(Some(&user)).await;

    assert_eq!(manager.status(&drama()), Some(WatchStatus::Watched));
    assert!(!manager.is_favorite(&drama()));
    // Local state is untouched and not merged upstream.
    assert_eq!(h.storage.get_item(FAVORITES_KEY).as_deref(), Some("[11]"));
    assert_eq!(h.backend.upsert_count(), 0);
}
