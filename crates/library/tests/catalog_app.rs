mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::{two_dramas, Harness, EMAIL, PASSWORD};
use dorama_core::catalog::{FILTER_ALL, FILTER_FAVORITES};
use dorama_core::drama::Drama;
use dorama_core::status::WatchStatus;
use dorama_db::memory::FailPoint;
use dorama_db::models::LibraryEntry;
use dorama_library::catalog::CatalogView;
use dorama_library::reviews::{ReviewForm, SubmitOutcome};
use dorama_library::{CatalogApp, LibraryError};
use tokio::sync::watch;

fn titles(view: &CatalogView) -> Vec<&str> {
    view.cards.iter().map(|c| c.drama.title.as_str()).collect()
}

async fn next_view(views: &mut watch::Receiver<CatalogView>) -> CatalogView {
    tokio::time::timeout(Duration::from_secs(2), views.changed())
        .await
        .expect("view update")
        .expect("sender alive");
    views.borrow_and_update().clone()
}

#[tokio::test]
async fn filter_search_and_favorites_scenario() {
    let h = Harness::new(two_dramas());
    let app = CatalogApp::start(h.deps(), &h.config()).await.unwrap();

    assert_eq!(titles(&app.select_filter("Drama").await), vec!["A"]);

    app.select_filter(FILTER_ALL).await;
    assert_eq!(titles(&app.search("b").await), vec!["B"]);

    app.search("").await;
    assert_eq!(app.toggle_favorite(2).await, Some(true));
    let favorites = app.select_filter(FILTER_FAVORITES).await;
    assert_eq!(titles(&favorites), vec!["B"]);
    assert!(favorites.cards[0].is_favorite);

    app.shutdown().await;
}

#[tokio::test]
async fn start_fails_when_items_cannot_load() {
    let h = Harness::new(two_dramas());
    h.backend.fail(FailPoint::ListDramas);

    let result = CatalogApp::start(h.deps(), &h.config()).await;
    assert_matches!(result, Err(LibraryError::Initialization(_)));
}

#[tokio::test]
async fn sign_in_reloads_user_data_and_resets_page() {
    let dramas = (1..=25)
        .map(|i| Drama::new(i, format!("T{i:02}"), &["Drama"]))
        .collect();
    let h = Harness::new(dramas);
    let app = CatalogApp::start(h.deps(), &h.config()).await.unwrap();

    app.set_status(3, Some(WatchStatus::Watching)).await;
    assert_eq!(app.next_page().await.page, 2);

    let user = h.backend.add_account(EMAIL, PASSWORD);
    h.backend.seed_library(
        user.id,
        LibraryEntry {
            drama_id: 1,
            status: Some(WatchStatus::Watched),
            is_favorite: true,
        },
    );

    let mut views = app.views();
    app.auth().sign_in(EMAIL, PASSWORD).await.unwrap();
    let view = next_view(&mut views).await;

    assert_eq!(view.page, 1);
    assert!(view.cards[0].is_favorite);
    assert_eq!(view.cards[0].status, Some(WatchStatus::Watched));
    assert_eq!(view.cards[2].status, None);

    app.auth().sign_out().await.unwrap();
    let view = next_view(&mut views).await;
    assert!(!view.cards[0].is_favorite);
    assert_eq!(view.cards[2].status, Some(WatchStatus::Watching));

    app.shutdown().await;
}

#[tokio::test]
async fn reviews_require_a_session() {
    let h = Harness::new(two_dramas());
    let app = CatalogApp::start(h.deps(), &h.config()).await.unwrap();
    let mut form = ReviewForm {
        rating: Some(4),
        comment: "Fun".into(),
    };

    let outcome = app.submit_review(1, &mut form).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::SignedOut);

    h.backend.add_account(EMAIL, PASSWORD);
    app.auth().sign_in(EMAIL, PASSWORD).await.unwrap();
    let outcome = app.submit_review(1, &mut form).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::Submitted(list) if list.len() == 1);
    assert_eq!(form, ReviewForm::default());

    app.auth().sign_out().await.unwrap();
    let listed = app.list_reviews(1).await.unwrap();
    assert_eq!(listed[0].author, "User");

    app.shutdown().await;
}

#[tokio::test]
async fn start_picks_up_an_existing_session() {
    let h = Harness::new(two_dramas());
    let user = h.sign_in().await;
    h.backend.seed_library(
        user.id,
        LibraryEntry {
            drama_id: 2,
            status: None,
            is_favorite: true,
        },
    );

    let app = CatalogApp::start(h.deps(), &h.config()).await.unwrap();
    assert_eq!(app.auth().current_user(), Some(user));
    assert_eq!(titles(&app.select_filter(FILTER_FAVORITES).await), vec!["B"]);

    app.shutdown().await;
}

#[tokio::test]
async fn provider_side_expiry_falls_back_to_local_data() {
    let h = Harness::new(two_dramas());
    let app = CatalogApp::start(h.deps(), &h.config()).await.unwrap();
    app.toggle_favorite(1).await;

    let user = h.backend.add_account(EMAIL, PASSWORD);
    h.backend.seed_library(
        user.id,
        LibraryEntry {
            drama_id: 2,
            status: None,
            is_favorite: true,
        },
    );
    let mut views = app.views();
    app.auth().sign_in(EMAIL, PASSWORD).await.unwrap();
    let view = next_view(&mut views).await;
    assert!(!view.cards[0].is_favorite);
    assert!(view.cards[1].is_favorite);

    h.backend.expire_session();
    let view = next_view(&mut views).await;
    assert!(!app.auth().is_authenticated());
    assert!(view.cards[0].is_favorite);
    assert!(!view.cards[1].is_favorite);

    app.shutdown().await;
}
