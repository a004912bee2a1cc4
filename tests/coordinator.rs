mod common;

use common::{test_pool, MockHost, SPACE_ID};

use lobbywarden::coordinator;
use lobbywarden::db::rosters;
use lobbywarden::models::user::UserRecord;
use lobbywarden::models::view::ToggleAction;

fn user_record(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        username: format!("user{id}"),
        global_name: None,
        avatar_url: String::new(),
        first_seen_at: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn test_double_toggle_restores_original_state() {
    let pool = test_pool().await;

    let outcome = coordinator::toggle_blacklist(&pool, "7", Some("troll"))
        .await
        .unwrap();
    assert_eq!(outcome.action, ToggleAction::Blacklist);

    // The second call is an unblacklist, so its reason is never stored.
    let outcome = coordinator::toggle_blacklist(&pool, "7", Some("new reason"))
        .await
        .unwrap();
    assert_eq!(outcome.action, ToggleAction::Unblacklist);

    assert!(rosters::roster(&pool, rosters::BLACKLIST).await.unwrap().is_empty());
    assert!(rosters::reason(&pool, "7").await.unwrap().is_none());
}

#[tokio::test]
async fn test_blacklisting_prunes_join_history() {
    let pool = test_pool().await;
    rosters::put_history(&pool, &[user_record("9"), user_record("10")])
        .await
        .unwrap();

    coordinator::toggle_blacklist(&pool, "9", None).await.unwrap();

    let history = rosters::history(&pool).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "10");
}

#[tokio::test]
async fn test_auto_ban_toggle_removes_only_given_ids() {
    let pool = test_pool().await;

    coordinator::toggle_auto_ban(&pool, &["A".to_string(), "B".to_string()])
        .await
        .unwrap();
    // A is flagged, so the whole selection {A, C} flips to unflag; B stays.
    let flagged = coordinator::toggle_auto_ban(&pool, &["A".to_string(), "C".to_string()])
        .await
        .unwrap();
    assert!(!flagged.contains("A"));
    assert!(!flagged.contains("C"));
    assert!(flagged.contains("B"));
}

#[tokio::test]
async fn test_request_ban_records_and_prunes_on_success() {
    let pool = test_pool().await;
    let host = MockHost::new();
    rosters::put_history(&pool, &[user_record("42"), user_record("9")])
        .await
        .unwrap();

    coordinator::request_ban(&pool, host.as_ref(), &["42".to_string()], SPACE_ID)
        .await
        .unwrap();

    let banned = rosters::roster(&pool, rosters::BANNED_USERS).await.unwrap();
    assert!(banned.contains("42"));
    let history = rosters::history(&pool).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "9");
    assert_eq!(host.submissions().len(), 1);
}

#[tokio::test]
async fn test_request_ban_failure_leaves_store_untouched() {
    let pool = test_pool().await;
    let host = MockHost::new();
    host.fail_submissions
        .store(true, std::sync::atomic::Ordering::SeqCst);

    coordinator::request_ban(&pool, host.as_ref(), &["42".to_string()], SPACE_ID)
        .await
        .unwrap();

    assert!(rosters::roster(&pool, rosters::BANNED_USERS).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_reasons_mixed_selection() {
    let pool = test_pool().await;
    coordinator::toggle_blacklist(&pool, "7", Some("old")).await.unwrap();

    coordinator::set_reasons(&pool, &["7".to_string(), "8".to_string()], "camping")
        .await
        .unwrap();

    let blacklist = rosters::roster(&pool, rosters::BLACKLIST).await.unwrap();
    assert!(blacklist.contains("7") && blacklist.contains("8"));
    assert_eq!(rosters::reason(&pool, "7").await.unwrap().as_deref(), Some("camping"));
    assert_eq!(rosters::reason(&pool, "8").await.unwrap().as_deref(), Some("camping"));
}

#[tokio::test]
async fn test_history_round_trip_preserves_order_and_timestamps() {
    let pool = test_pool().await;
    let records = vec![user_record("1"), user_record("2"), user_record("3")];
    rosters::put_history(&pool, &records).await.unwrap();

    let loaded = rosters::history(&pool).await.unwrap();
    let ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(loaded[0].first_seen_at, records[0].first_seen_at);
}

#[tokio::test]
async fn test_session_clear_keeps_autoban_and_blacklist() {
    let pool = test_pool().await;
    rosters::add_to_roster(&pool, rosters::BANNED_USERS, &["1".to_string()])
        .await
        .unwrap();
    rosters::add_to_roster(&pool, rosters::AUTOBAN_USERS, &["2".to_string()])
        .await
        .unwrap();
    rosters::add_to_roster(&pool, rosters::BLACKLIST, &["3".to_string()])
        .await
        .unwrap();
    rosters::put_history(&pool, &[user_record("9")]).await.unwrap();

    rosters::clear_session(&pool).await.unwrap();

    assert!(rosters::roster(&pool, rosters::BANNED_USERS).await.unwrap().is_empty());
    assert!(rosters::history(&pool).await.unwrap().is_empty());
    assert!(rosters::roster(&pool, rosters::AUTOBAN_USERS).await.unwrap().contains("2"));
    assert!(rosters::roster(&pool, rosters::BLACKLIST).await.unwrap().contains("3"));
}
