mod common;

use cinesync::api::CollectionKind;
use cinesync::models::Severity;
use cinesync::navigation::Route;
use cinesync::SyncError;
use common::{client_fixture, entry, FakeApi, USERNAME};
use std::sync::atomic::Ordering;
use std::time::Duration;

fn ids(entries: &[cinesync::models::CollectionEntry]) -> Vec<u64> {
    entries.iter().map(|e| e.movie_id).collect()
}

#[tokio::test]
async fn test_adding_the_same_movie_twice_keeps_one_entry() {
    let fx = client_fixture();
    fx.client.login(USERNAME, "secret").await.unwrap();

    fx.client.favorites().add(5).await.unwrap();
    fx.client.favorites().add(5).await.unwrap();

    assert_eq!(ids(&fx.client.favorites().entries()), vec![5]);
    let successes = fx
        .client
        .notifications()
        .list()
        .into_iter()
        .filter(|n| n.severity == Severity::Success && n.message == "Added to favorites!")
        .count();
    assert_eq!(successes, 2);
}

#[tokio::test]
async fn test_add_only_touches_its_own_collection() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Watchlist, &[9]);
    fx.client.login(USERNAME, "secret").await.unwrap();

    fx.client.favorites().add(3).await.unwrap();

    assert_eq!(ids(&fx.client.favorites().entries()), vec![3]);
    assert_eq!(ids(&fx.client.watchlist().entries()), vec![9]);
}

#[tokio::test]
async fn test_offline_add_twice_reports_two_failures_and_keeps_state() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Favorites, &[1]);
    fx.client.login(USERNAME, "secret").await.unwrap();
    fx.api.set_offline(true);

    let first = fx.client.favorites().add(42).await.unwrap_err();
    let second = fx.client.favorites().add(42).await.unwrap_err();

    assert!(matches!(first, SyncError::Network(_)));
    assert!(matches!(second, SyncError::Network(_)));
    assert_eq!(ids(&fx.client.favorites().entries()), vec![1]);

    let notes = fx.client.notifications().list();
    assert_eq!(notes.len(), 2);
    assert!(notes
        .iter()
        .all(|n| n.severity == Severity::Error && n.message == "Failed to add to favorites"));

    fx.api.set_offline(false);
    let reconciled = fx.client.favorites().refetch().await.unwrap();
    assert_eq!(ids(&reconciled), vec![1]);
}

#[tokio::test]
async fn test_anonymous_add_asks_for_login() {
    let fx = client_fixture();

    let err = fx.client.favorites().add(7).await.unwrap_err();

    assert!(matches!(err, SyncError::Unauthenticated));
    assert_eq!(FakeApi::count(&fx.api.add_calls), 0);
    assert!(fx.client.favorites().entries().is_empty());

    let notes = fx.client.notifications().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Warning);
    assert_eq!(notes[0].message, "Please login to add to your favorites");
    assert_eq!(fx.client.navigation().drain(), vec![Route::Login]);
}

#[tokio::test]
async fn test_anonymous_remove_asks_for_login() {
    let fx = client_fixture();

    let err = fx.client.watchlist().remove(7).await.unwrap_err();

    assert!(matches!(err, SyncError::Unauthenticated));
    assert_eq!(FakeApi::count(&fx.api.delete_calls), 0);
    assert_eq!(fx.client.navigation().drain(), vec![Route::Login]);
}

#[tokio::test(start_paused = true)]
async fn test_remove_is_optimistic_and_failed_delete_is_restored() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Favorites, &[5, 6]);
    fx.client.login(USERNAME, "secret").await.unwrap();
    fx.api.fail_deletes.store(true, Ordering::SeqCst);
    fx.api.delete_delay_ms.store(1_000, Ordering::SeqCst);

    let favorites = fx.client.favorites().clone();
    let pending = tokio::spawn(async move { favorites.remove(5).await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(!fx.client.favorites().contains(5));
    assert!(fx.client.favorites().contains(6));

    let outcome = pending.await.unwrap();
    assert!(matches!(outcome, Err(SyncError::Api { status: 500, .. })));
    assert_eq!(ids(&fx.client.favorites().entries()), vec![5, 6]);

    let notes = fx.client.notifications().list();
    assert_eq!(notes[0].message, "Failed to remove from favorites");
    assert_eq!(notes[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_remove_success_notifies_and_stays_removed() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Watchlist, &[5, 6]);
    fx.client.login(USERNAME, "secret").await.unwrap();

    fx.client.watchlist().remove(5).await.unwrap();

    assert_eq!(ids(&fx.client.watchlist().entries()), vec![6]);
    let notes = fx.client.notifications().list();
    assert_eq!(notes[0].message, "Removed from watchlist");
    assert_eq!(notes[0].severity, Severity::Info);
}

#[tokio::test]
async fn test_refetch_replaces_local_state_wholesale() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Favorites, &[1, 2]);
    fx.client.login(USERNAME, "secret").await.unwrap();
    assert_eq!(ids(&fx.client.favorites().entries()), vec![1, 2]);

    fx.api.seed(CollectionKind::Favorites, &[3]);
    fx.client.favorites().refetch().await.unwrap();

    assert_eq!(ids(&fx.client.favorites().entries()), vec![3]);
}

#[tokio::test]
async fn test_refetch_drops_duplicate_server_entries() {
    let fx = client_fixture();
    *fx.api.favorites.lock().unwrap() = vec![entry(4), entry(8), entry(4)];
    fx.client.login(USERNAME, "secret").await.unwrap();

    assert_eq!(ids(&fx.client.favorites().entries()), vec![4, 8]);
}

#[tokio::test]
async fn test_refresh_failure_empties_every_session_collection() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Favorites, &[1, 2]);
    fx.api.seed(CollectionKind::Watchlist, &[3]);
    fx.api.seed_recommendations(&[10, 11]);
    fx.client.login(USERNAME, "secret").await.unwrap();
    fx.client.movie(10).await.unwrap();
    fx.client.search("alien", None).await.unwrap();
    assert!(!fx.client.favorites().entries().is_empty());
    assert!(!fx.client.recommendations().current().is_empty());

    fx.api.reject_refresh.store(true, Ordering::SeqCst);
    fx.client.session().refresh().await.unwrap_err();

    assert!(!fx.client.session().is_authenticated());
    assert!(fx.client.favorites().entries().is_empty());
    assert!(fx.client.watchlist().entries().is_empty());
    assert!(fx.client.recommendations().current().is_empty());
    assert!(fx.client.watch_history().is_empty());
    assert!(fx.client.search_history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_logout_during_refetch_leaves_everything_empty() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Favorites, &[1, 2]);
    fx.api.seed_recommendations(&[10]);
    fx.client.session().login(USERNAME, "secret").await.unwrap();
    fx.api.fetch_delay_ms.store(1_000, Ordering::SeqCst);

    let favorites = fx.client.favorites().clone();
    let feed = fx.client.recommendations().clone();
    let pending_favorites = tokio::spawn(async move { favorites.refetch().await });
    let pending_feed = tokio::spawn(async move { feed.refetch().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    fx.client.logout();

    assert!(matches!(pending_favorites.await.unwrap(), Err(SyncError::StaleSession)));
    assert!(matches!(pending_feed.await.unwrap(), Err(SyncError::StaleSession)));
    assert!(fx.client.favorites().entries().is_empty());
    assert!(fx.client.recommendations().current().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_logout_racing_refetch_never_leaves_stale_entries() {
    let fx = client_fixture();
    fx.api.seed(CollectionKind::Favorites, &[1, 2]);
    fx.api.seed(CollectionKind::Watchlist, &[3]);
    fx.api.seed_recommendations(&[10]);

    for _ in 0..200 {
        fx.client.session().login(USERNAME, "secret").await.unwrap();
        let favorites = fx.client.favorites().clone();
        let watchlist = fx.client.watchlist().clone();
        let feed = fx.client.recommendations().clone();
        let pending = tokio::spawn(async move {
            let _ = tokio::join!(favorites.refetch(), watchlist.refetch(), feed.refetch());
        });
        tokio::task::yield_now().await;
        fx.client.logout();
        pending.await.unwrap();

        assert!(fx.client.favorites().entries().is_empty());
        assert!(fx.client.watchlist().entries().is_empty());
        assert!(fx.client.recommendations().current().is_empty());
    }
}

#[tokio::test]
async fn test_subscribers_see_collection_changes() {
    let fx = client_fixture();
    let mut updates = fx.client.favorites().subscribe();
    fx.client.login(USERNAME, "secret").await.unwrap();

    fx.client.favorites().add(12).await.unwrap();

    assert!(updates.has_changed().unwrap());
    assert_eq!(ids(&updates.borrow_and_update()), vec![12]);
}

#[tokio::test]
async fn test_rating_out_of_range_is_rejected_locally() {
    let fx = client_fixture();
    fx.client.login(USERNAME, "secret").await.unwrap();

    let err = fx.client.recommendations().rate(3, 11, None).await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
    let err = fx.client.recommendations().rate(3, 0, None).await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
    assert!(fx.api.ratings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rating_reloads_recommendations() {
    let fx = client_fixture();
    fx.client.login(USERNAME, "secret").await.unwrap();
    assert!(fx.client.recommendations().current().is_empty());

    fx.api.seed_recommendations(&[20]);
    fx.client
        .recommendations()
        .rate(3, 9, Some("great".to_string()))
        .await
        .unwrap();

    let ratings = fx.api.ratings.lock().unwrap().clone();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].movie_id, 3);
    assert_eq!(ratings[0].rating, 9);
    assert_eq!(ratings[0].feedback, "great");
    assert_eq!(fx.client.recommendations().current().recommendations[0].id, 20);
}
