//! Tests for the recorder: persistence, notification and delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use statkeeper::{
    ChangeKind, GameRecorder, GameState, GameStatus, GameStore, GameUploader, League,
    MemoryGameStore, Player, RecorderError, SubmissionPayload, SyncError, Team, TeamDirectory,
};

/// Stands in for the stats server.
#[derive(Debug, Default)]
struct FakeServer {
    fail_uploads: AtomicBool,
    uploads: AtomicUsize,
}

#[async_trait]
impl GameUploader for FakeServer {
    async fn upload(&self, payload: &SubmissionPayload) -> Result<Option<i64>, SyncError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(SyncError::http(500, "boom"));
        }
        assert_eq!(*payload.league_id(), 1);
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(Some(777))
    }
}

#[async_trait]
impl TeamDirectory for FakeServer {
    async fn leagues(&self) -> Result<Vec<League>, SyncError> {
        Ok(vec![League::new(1, "Tuesday League", 2)])
    }

    async fn teams(&self, league_id: i64) -> Result<Vec<Team>, SyncError> {
        if league_id != 1 {
            return Ok(Vec::new());
        }
        Ok(vec![
            Team::new(10, "Hawks", vec![Player::new("P1", true), Player::new("P3", false)]),
            Team::new(11, "Owls", vec![Player::new("P2", true), Player::new("P4", false)]),
        ])
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

async fn setup() -> (Arc<MemoryGameStore>, Arc<FakeServer>, GameRecorder) {
    let store = Arc::new(MemoryGameStore::new());
    let server = Arc::new(FakeServer::default());
    let recorder = GameRecorder::create(server.as_ref(), store.clone(), server.clone(), 1, 3, 10, 11)
        .await
        .expect("Create failed");
    (store, server, recorder)
}

/// Plays one full point: P1 pulls, P2 picks up and passes to P4, who scores.
async fn play_point(recorder: &mut GameRecorder) {
    assert!(recorder
        .select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]))
        .await
        .expect("Lines failed"));
    assert!(recorder.select_first_actor("P1", true).await.expect("Select failed"));
    assert!(recorder.record_pull().await.expect("Pull failed"));
    assert!(recorder.select_first_actor("P2", false).await.expect("Select failed"));
    assert!(recorder.record_pass("P4").await.expect("Pass failed"));
    assert!(recorder.record_point().await.expect("Point failed"));
}

#[tokio::test]
async fn test_create_resolves_league_and_teams() {
    let (store, _server, recorder) = setup().await;

    let game = recorder.game();
    assert_eq!(*game.local_id(), Some(1));
    assert_eq!(*game.league().line_size(), 2);
    assert_eq!(game.home_team().name(), "Hawks");
    assert_eq!(game.away_team().name(), "Owls");
    assert_eq!(recorder.state(), GameState::SelectingLines);
    assert_eq!(recorder.status(), GameStatus::New);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_create_rejects_unknown_or_identical_teams() {
    let store = Arc::new(MemoryGameStore::new());
    let server = Arc::new(FakeServer::default());

    let unknown =
        GameRecorder::create(server.as_ref(), store.clone(), server.clone(), 1, 3, 10, 99).await;
    assert!(matches!(unknown, Err(RecorderError::Sync(_))));

    let same =
        GameRecorder::create(server.as_ref(), store.clone(), server.clone(), 1, 3, 10, 10).await;
    assert!(matches!(same, Err(RecorderError::Sync(_))));

    let league =
        GameRecorder::create(server.as_ref(), store.clone(), server.clone(), 5, 3, 10, 11).await;
    assert!(matches!(league, Err(RecorderError::Sync(_))));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_commands_persist_and_notify() {
    let (store, server, mut recorder) = setup().await;
    let mut changes = recorder.subscribe();

    recorder
        .select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]))
        .await
        .expect("Lines failed");
    let change = changes.try_recv().expect("No notification");
    assert_eq!(*change.kind(), ChangeKind::Selection);
    assert_eq!(*change.state(), GameState::Start);
    assert_eq!(*change.status(), GameStatus::InProgress);

    recorder.select_first_actor("P1", true).await.expect("Select failed");
    let change = changes.try_recv().expect("No notification");
    assert_eq!(*change.kind(), ChangeKind::Recorded);
    assert_eq!(*change.state(), GameState::Pull);

    let stored = store
        .load(1)
        .await
        .expect("Load failed")
        .expect("Game missing");
    assert_eq!(&stored, recorder.game());

    let reopened = GameRecorder::open(1, store.clone(), server.clone())
        .await
        .expect("Open failed");
    assert_eq!(reopened.state(), GameState::Pull);
}

#[tokio::test]
async fn test_inapplicable_command_changes_nothing() {
    let (_store, _server, mut recorder) = setup().await;
    let mut changes = recorder.subscribe();

    let applied = recorder.record_pull().await.expect("Pull errored");
    assert!(!applied);
    assert!(changes.try_recv().is_err(), "No change expected");
    assert_eq!(recorder.status(), GameStatus::New);
}

#[tokio::test]
async fn test_local_write_failure_keeps_state_and_allows_retry() {
    let (store, _server, mut recorder) = setup().await;
    recorder
        .select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]))
        .await
        .expect("Lines failed");
    let mut changes = recorder.subscribe();

    store.set_fail_writes(true);
    let result = recorder.select_first_actor("P1", true).await;
    assert!(matches!(result, Err(RecorderError::Store(_))));
    assert_eq!(recorder.state(), GameState::Start);
    assert!(recorder.game().first_actor().is_none());
    assert_eq!(
        recorder.game().local_error().as_deref(),
        Some("Storage unavailable")
    );
    assert_eq!(
        *changes.try_recv().expect("No notification").kind(),
        ChangeKind::LocalError
    );

    store.set_fail_writes(false);
    assert!(recorder.select_first_actor("P1", true).await.expect("Retry failed"));
    assert_eq!(recorder.state(), GameState::Pull);
    assert!(recorder.game().local_error().is_none());
}

#[tokio::test]
async fn test_undo_is_persisted() {
    let (store, server, mut recorder) = setup().await;
    play_point(&mut recorder).await;
    assert_eq!(recorder.score(), (0, 1));

    assert!(recorder.undo().await.expect("Undo failed"));
    assert_eq!(recorder.score(), (0, 0));
    assert_eq!(recorder.state(), GameState::Normal);

    let reopened = GameRecorder::open(1, store.clone(), server.clone())
        .await
        .expect("Open failed");
    assert_eq!(reopened.score(), (0, 0));
    assert_eq!(reopened.state(), GameState::Normal);
    assert!(reopened.can_undo());
}

#[tokio::test]
async fn test_next_lines_open_point_for_receiving_team() {
    let (store, server, mut recorder) = setup().await;
    play_point(&mut recorder).await;

    assert!(recorder
        .select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]))
        .await
        .expect("Lines failed"));
    assert_eq!(recorder.state(), GameState::PickUp);
    assert!(!recorder.select_first_actor("P2", false).await.expect("Select errored"));
    assert!(recorder.select_first_actor("P3", true).await.expect("Select failed"));

    let reopened = GameRecorder::open(1, store.clone(), server.clone())
        .await
        .expect("Open failed");
    assert_eq!(reopened.state(), GameState::FirstThrow);
    assert!(*reopened.game().home_possession());
}

#[tokio::test]
async fn test_roster_update_is_undoable_and_persisted() {
    let (store, server, mut recorder) = setup().await;
    recorder
        .select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]))
        .await
        .expect("Lines failed");

    assert!(recorder
        .update_rosters(vec![Player::new("P1", true)], vec![Player::new("P2", true)])
        .await
        .expect("Roster update failed"));
    assert_eq!(recorder.game().home_players().clone(), Some(names(&["P1"])));

    assert!(recorder.undo().await.expect("Undo failed"));
    let reopened = GameRecorder::open(1, store.clone(), server.clone())
        .await
        .expect("Open failed");
    assert_eq!(reopened.game().home_team().roster().len(), 2);
    assert_eq!(reopened.game().home_players().clone(), Some(names(&["P1", "P3"])));
}

#[tokio::test]
async fn test_submit_uploads_and_locks() {
    let (store, server, mut recorder) = setup().await;
    play_point(&mut recorder).await;

    let status = recorder.submit().await.expect("Submit failed");
    assert_eq!(status, GameStatus::Uploaded);
    assert_eq!(server.uploads.load(Ordering::SeqCst), 1);
    assert_eq!(*recorder.game().server_id(), Some(777));
    assert!(recorder.enabled_actions().is_empty());

    assert!(!recorder.undo().await.expect("Undo errored"));
    assert!(
        !recorder
            .select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]))
            .await
            .expect("Lines errored")
    );
    assert_eq!(recorder.score(), (0, 1));

    // Submitting again does not upload twice.
    assert_eq!(
        recorder.submit().await.expect("Submit failed"),
        GameStatus::Uploaded
    );
    assert_eq!(server.uploads.load(Ordering::SeqCst), 1);

    let stored = store.load(1).await.expect("Load failed").expect("Game missing");
    assert_eq!(*stored.status(), GameStatus::Uploaded);
}

#[tokio::test]
async fn test_failed_upload_records_sync_error_then_resync_succeeds() {
    let (store, server, mut recorder) = setup().await;
    play_point(&mut recorder).await;

    server.fail_uploads.store(true, Ordering::SeqCst);
    let result = recorder.submit().await;
    assert!(matches!(result, Err(RecorderError::Sync(_))));
    assert_eq!(recorder.status(), GameStatus::SyncError);
    assert_eq!(recorder.game().sync_error().as_deref(), Some("500: boom"));

    let stored = store.load(1).await.expect("Load failed").expect("Game missing");
    assert_eq!(*stored.status(), GameStatus::SyncError);

    server.fail_uploads.store(false, Ordering::SeqCst);
    let status = recorder.resync().await.expect("Resync failed");
    assert_eq!(status, GameStatus::Uploaded);
    assert!(recorder.game().sync_error().is_none());
}

#[tokio::test]
async fn test_editing_after_sync_error_resumes_recording() {
    let (_store, server, mut recorder) = setup().await;
    play_point(&mut recorder).await;

    server.fail_uploads.store(true, Ordering::SeqCst);
    assert!(recorder.submit().await.is_err());

    assert!(recorder.undo().await.expect("Undo failed"));
    assert_eq!(recorder.status(), GameStatus::InProgress);
}

#[tokio::test]
async fn test_pause_and_resume() {
    let (_store, _server, mut recorder) = setup().await;
    recorder
        .select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]))
        .await
        .expect("Lines failed");

    assert!(recorder.pause().await.expect("Pause failed"));
    assert_eq!(recorder.status(), GameStatus::Paused);
    assert!(!recorder.pause().await.expect("Pause errored"));

    recorder.select_first_actor("P1", true).await.expect("Select failed");
    assert_eq!(recorder.status(), GameStatus::InProgress);
}

#[tokio::test]
async fn test_open_unknown_game() {
    let store = Arc::new(MemoryGameStore::new());
    let server = Arc::new(FakeServer::default());
    let result = GameRecorder::open(5, store, server).await;
    assert!(matches!(result, Err(RecorderError::NotFound(5))));
}

#[tokio::test]
async fn test_store_lists_summaries() {
    let (store, _server, mut recorder) = setup().await;
    play_point(&mut recorder).await;

    let summaries = store.list().await.expect("List failed");
    assert_eq!(summaries.len(), 1);
    assert_eq!(*summaries[0].local_id(), 1);
    assert_eq!(summaries[0].home_team(), "Hawks");
    assert_eq!(*summaries[0].status(), GameStatus::InProgress);
}
