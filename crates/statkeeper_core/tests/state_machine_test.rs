//! Tests for state derivation and forward commands.

use statkeeper_core::{Action, EventType, Game, GameState, League, Player, Team};

fn new_game() -> Game {
    let home = Team::new(
        10,
        "Home",
        vec![
            Player::new("P1", true),
            Player::new("P3", false),
            Player::new("P5", true),
        ],
    );
    let away = Team::new(
        20,
        "Away",
        vec![
            Player::new("P2", true),
            Player::new("P4", false),
            Player::new("P6", false),
        ],
    );
    Game::new(League::new(1, "Test League", 2), 3, home, away)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn game_with_lines() -> Game {
    let mut game = new_game();
    assert!(game.select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"])));
    game
}

#[test]
fn test_new_game_selects_lines() {
    let game = new_game();
    assert_eq!(game.state(), GameState::SelectingLines);
    assert!(game.active_point().is_none());
    assert!(game.undo_stack().is_empty());
}

#[test]
fn test_editing_lines_wins_over_everything() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    assert!(game.begin_line_edit());
    assert_eq!(game.state(), GameState::EditingLines);
    assert!(game.cancel_line_edit());
    assert_eq!(game.state(), GameState::Pull);
}

#[test]
fn test_lines_chosen_enters_start() {
    let game = game_with_lines();
    assert_eq!(game.state(), GameState::Start);
    assert!(game.enabled_actions().contains(&Action::SelectAnyPlayer));
}

#[test]
fn test_pull_sequence_states() {
    let mut game = game_with_lines();

    assert!(game.select_first_actor("P1", true));
    assert_eq!(game.state(), GameState::Pull);
    assert!(*game.home_possession());

    assert!(game.record_pull());
    assert_eq!(game.state(), GameState::PickUp);
    assert!(!*game.home_possession());
    let point = game.active_point().as_ref().expect("Point active");
    assert_eq!(point.offense_players(), &names(&["P2", "P4"]));
    assert_eq!(point.defense_players(), &names(&["P1", "P3"]));

    assert!(game.select_first_actor("P2", false));
    assert_eq!(game.state(), GameState::AfterPull);

    assert!(game.record_pass("P4"));
    assert_eq!(game.state(), GameState::Normal);
    assert_eq!(game.first_actor().as_deref(), Some("P4"));

    assert!(game.record_throw_away());
    assert_eq!(game.state(), GameState::PickUp);
    assert!(*game.home_possession());

    assert!(game.select_first_actor("P1", true));
    assert_eq!(game.state(), GameState::AfterTurnover);
    assert!(game.enabled_actions().contains(&Action::Defense));

    assert!(game.record_defense());
    assert_eq!(game.state(), GameState::PickUp);
    assert!(game.first_actor().is_none());
    assert!(*game.home_possession());
}

#[test]
fn test_drop_leads_to_after_drop() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_pass("P4");
    assert!(game.record_drop());
    assert!(*game.home_possession());
    game.select_first_actor("P3", true);
    assert_eq!(game.state(), GameState::AfterDrop);
}

#[test]
fn test_catch_defense_keeps_actor() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_throw_away();
    game.select_first_actor("P3", true);
    assert!(game.record_catch_defense());
    assert_eq!(game.first_actor().as_deref(), Some("P3"));
    assert_eq!(game.state(), GameState::Normal);
}

#[test]
fn test_point_scores_for_possessing_team_and_flips() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_pass("P4");
    let before = *game.home_possession();

    assert!(game.record_point());

    assert_eq!(game.score(), (0, 1));
    assert_eq!(*game.home_possession(), !before);
    assert_eq!(game.points().len(), 1);
    assert!(game.active_point().is_none());
    assert!(game.first_actor().is_none());
    assert!(game.home_players().is_none());
    assert_eq!(
        game.last_played_line().as_ref().map(|l| l.home.clone()),
        Some(names(&["P1", "P3"]))
    );
    assert_eq!(game.state(), GameState::SelectingLines);
    let last = game.points()[0].events().last().expect("Has events");
    assert_eq!(*last.event_type(), EventType::Point);
    assert_eq!(last.first_actor(), "P4");
}

#[test]
fn test_second_point_starts_without_pull() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_point();

    game.select_active_lines(names(&["P1", "P5"]), names(&["P2", "P6"]));
    assert_eq!(game.state(), GameState::PickUp);
    assert!(game.player_enabled("P5", true));
    assert!(!game.player_enabled("P2", false), "Scoring team does not receive");
    game.select_first_actor("P5", true);
    assert_eq!(game.state(), GameState::FirstThrow);
    assert!(game.record_pass("P1"));
    assert_eq!(game.state(), GameState::Normal);
}

#[test]
fn test_lines_after_score_open_point_for_receiving_team() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_point();
    assert_eq!(game.score(), (0, 1));
    assert!(*game.home_possession(), "Home receives after away scores");
    let depth = game.undo_stack().len();

    assert!(game.select_active_lines(names(&["P1", "P5"]), names(&["P4", "P6"])));
    assert_eq!(game.undo_stack().len(), depth, "Line selection pushes no record");
    assert_eq!(game.state(), GameState::PickUp);
    let point = game.active_point().as_ref().expect("Point opened");
    assert_eq!(point.offense_players(), &names(&["P1", "P5"]));
    assert_eq!(point.defense_players(), &names(&["P4", "P6"]));
    assert_eq!(point.event_count(), 0);

    assert!(!game.player_enabled("P4", false));
    assert!(!game.select_first_actor("P4", false), "Scoring team cannot pick up");
    assert!(*game.home_possession());
    assert!(game.first_actor().is_none());

    assert!(game.select_first_actor("P1", true));
    assert_eq!(game.state(), GameState::FirstThrow);
    assert!(game.record_pass("P5"));
    assert!(game.record_point());
    assert_eq!(game.score(), (1, 1));
}

#[test]
fn test_half_discards_unstarted_point() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_point();
    game.select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]));
    assert!(game.active_point().is_some());
    assert!(game.enabled_actions().contains(&Action::Half));

    assert!(game.record_half());
    assert!(game.active_point().is_none());
    assert_eq!(game.state(), GameState::SelectingLines);
}

#[test]
fn test_half_refused_once_point_started() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_point();
    game.select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]));
    game.select_first_actor("P1", true);

    assert!(!game.enabled_actions().contains(&Action::Half));
    assert!(!game.record_half());
}

#[test]
fn test_half_resets_to_pull() {
    let mut game = game_with_lines();
    assert!(!game.record_half(), "No points played yet");

    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_point();

    assert!(game.record_half());
    assert_eq!(*game.points_at_half(), 1);
    assert_eq!(game.state(), GameState::SelectingLines);
    assert!(!game.record_half(), "Half only once");

    game.select_active_lines(names(&["P1", "P3"]), names(&["P2", "P4"]));
    game.select_first_actor("P2", false);
    assert_eq!(game.state(), GameState::Pull);
}

#[test]
fn test_preconditions_are_no_ops() {
    let mut game = new_game();
    assert!(!game.select_first_actor("P1", true));
    assert!(!game.record_pull());
    assert!(!game.record_pass("P3"));
    assert!(!game.record_drop());
    assert!(!game.record_throw_away());
    assert!(!game.record_defense());
    assert!(!game.record_catch_defense());
    assert!(!game.record_point());
    assert!(!game.substitute_during_point(names(&["P1"]), names(&["P2"])));
    assert!(game.undo().is_none());
    assert!(game.undo_stack().is_empty());

    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    let depth = game.undo_stack().len();
    assert!(!game.record_pass("P4"), "Disc is loose");
    assert!(!game.record_point(), "Disc is loose");
    assert_eq!(game.undo_stack().len(), depth);
}

#[test]
fn test_player_enablement_by_state() {
    let mut game = game_with_lines();
    assert!(game.player_enabled("P1", true));
    assert!(game.player_enabled("P2", false));
    assert!(!game.player_enabled("P5", true), "Not on the line");

    game.select_first_actor("P1", true);
    assert!(!game.player_enabled("P3", true), "Pull state takes no player");
    game.record_pull();
    assert!(game.player_enabled("P2", false));
    assert!(!game.player_enabled("P1", true), "Only the receiving team picks up");

    game.select_first_actor("P2", false);
    assert!(game.player_enabled("P4", false));
    assert!(!game.player_enabled("P2", false), "Cannot pass to self");
}

#[test]
fn test_enabled_actions_include_half_between_points() {
    let mut game = game_with_lines();
    assert!(!game.enabled_actions().contains(&Action::Half));
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_point();
    assert!(game.enabled_actions().contains(&Action::Half));
}

#[test]
fn test_event_history_is_readable() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_pass("P4");
    game.record_drop();
    game.select_first_actor("P1", true);
    game.record_defense();
    assert_eq!(
        game.event_history(),
        vec![
            "P1 pulled".to_string(),
            "P2 passed to P4".to_string(),
            "P4 dropped it".to_string(),
            "P1 got a block".to_string(),
        ]
    );
}

#[test]
fn test_suggested_line_rotates_rested_players() {
    let mut game = game_with_lines();
    assert_eq!(game.suggested_line().home, names(&["P1", "P3"]));

    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_point();

    let suggestion = game.suggested_line();
    assert_eq!(suggestion.home, names(&["P5", "P1"]));
    assert_eq!(suggestion.away, names(&["P6", "P2"]));
}

#[test]
fn test_roster_update_trims_lines() {
    let mut game = game_with_lines();
    assert!(game.begin_roster_edit());
    assert!(*game.is_editing_rosters());
    assert!(game.update_rosters(
        vec![Player::new("P3", false), Player::new("P1", true)],
        vec![Player::new("P2", true)],
    ));
    assert!(!*game.is_editing_rosters());
    assert_eq!(game.home_team().sorted_names(), names(&["P1", "P3"]));
    assert_eq!(game.away_players().clone(), Some(names(&["P2"])));
    assert_eq!(game.undo_stack().len(), 1, "Roster update is undoable");
}

#[test]
fn test_roster_update_clears_removed_holder() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);
    game.record_pass("P4");

    assert!(game.update_rosters(
        vec![Player::new("P1", true), Player::new("P3", false)],
        vec![Player::new("P2", true)],
    ));
    assert!(game.first_actor().is_none(), "Holder left the roster");
    assert_eq!(game.state(), GameState::PickUp);
    let point = game.active_point().as_ref().expect("Point active");
    assert_eq!(point.offense_players(), &names(&["P2"]));
    assert_eq!(point.event_count(), 2, "Recorded events are kept");
}

#[test]
fn test_roster_update_keeps_holder_still_rostered() {
    let mut game = game_with_lines();
    game.select_first_actor("P1", true);
    game.record_pull();
    game.select_first_actor("P2", false);

    assert!(game.update_rosters(
        vec![Player::new("P1", true)],
        vec![Player::new("P2", true), Player::new("P4", false)],
    ));
    assert_eq!(game.first_actor().as_deref(), Some("P2"));
    assert_eq!(game.home_players().clone(), Some(names(&["P1"])));
}

#[test]
fn test_cancel_roster_edit_keeps_rosters() {
    let mut game = game_with_lines();
    assert!(!game.cancel_roster_edit());
    assert!(game.begin_roster_edit());
    assert!(!game.begin_roster_edit());
    assert!(game.cancel_roster_edit());
    assert_eq!(game.home_team().roster().len(), 3);
    assert!(game.undo_stack().is_empty());
}
