// Integration tests for the number-guesser application
// These tests drive the game loop through the line interface with scripted input

use number_guesser::cli::CliInterface;
use number_guesser::*;
use std::io::Cursor;

fn play(script: &str) -> (LoopStats, GameSession<ManualClock>) {
    let mut session = GameSession::with_clock(ManualClock::new(1_000));
    let mut interface = CliInterface::new(Cursor::new(script.to_string()));
    let stats = game_loop(&mut session, SearchRange::new(1, 100), &mut interface);
    (stats, session)
}

#[test]
fn test_default_range_game_won() {
    // ENTER accepts 1-100; 50 is too low, 75 is it
    let (stats, session) = play("\nl\nc\nexit\n");

    assert_eq!(stats, LoopStats { games_won: 1, games_failed: 0 });
    assert_eq!(session.status(), GameStatus::Won);
    let summary = session.summary().expect("won game has a summary");
    assert_eq!(summary.number, 75);
    assert_eq!(summary.total_guesses, 2);
    assert_eq!(summary.max_expected_guesses, 8);

    let values: Vec<i64> = session.history().iter().map(|r| r.value).collect();
    assert_eq!(values, vec![50, 75]);
}

#[test]
fn test_play_again_keeps_range() {
    let (stats, session) = play("1 10\nc\np\nh\nc\nexit\n");

    assert_eq!(stats.games_won, 2);
    assert_eq!(session.original_range(), Some(SearchRange::new(1, 10)));
    // second game: 5 too high, then 2 is correct
    let summary = session.summary().expect("summary");
    assert_eq!(summary.number, 2);
    assert_eq!(summary.total_guesses, 2);
}

#[test]
fn test_invalid_range_then_valid_range() {
    let (stats, session) = play("10 5\n7 7\n1 3\nc\n");

    assert_eq!(stats.games_won, 1);
    assert_eq!(session.summary().map(|s| s.number), Some(2));
}

#[test]
fn test_preset_name_at_setup() {
    let (stats, session) = play("hard\nc\nexit\n");

    assert_eq!(stats.games_won, 1);
    assert_eq!(session.original_range(), Some(SearchRange::new(1, 10_000)));
    assert_eq!(session.summary().map(|s| s.number), Some(5_000));
}

#[test]
fn test_inconsistent_feedback_is_rejected_and_game_continues() {
    // With 0..1 the first guess is 0, so "too high" is impossible
    let (stats, session) = play("0 1\nh\nc\nexit\n");

    assert_eq!(stats.games_won, 1);
    let summary = session.summary().expect("summary");
    assert_eq!(summary.number, 0);
    assert_eq!(summary.total_guesses, 1);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_unrecognised_answers_are_ignored() {
    let (stats, session) = play("1 100\nmaybe\n\nc\n");

    assert_eq!(stats.games_won, 1);
    assert_eq!(session.summary().map(|s| s.total_guesses), Some(1));
}

#[test]
fn test_reset_returns_to_setup() {
    let (stats, session) = play("1 100\nl\nreset\n1 8\nc\nn\n");

    assert_eq!(stats.games_won, 1);
    // 'n' after the win goes back to setup, where input runs out
    assert_eq!(session.status(), GameStatus::Idle);
    assert_eq!(session.original_range(), Some(SearchRange::new(1, 8)));
}

#[test]
fn test_end_of_input_at_setup_exits() {
    let (stats, session) = play("");

    assert_eq!(stats, LoopStats::default());
    assert_eq!(session.status(), GameStatus::Idle);
}

#[test]
fn test_end_of_input_mid_game_leaves_game_active() {
    let (stats, session) = play("1 100\nl\nh\n");

    assert_eq!(stats, LoopStats::default());
    assert_eq!(session.status(), GameStatus::Active);
    assert_eq!(session.guess_count(), 3);
    assert_eq!(session.range(), Some(SearchRange::new(51, 74)));
    assert_eq!(session.current_guess(), Some(62));
}

#[test]
fn test_full_descent_to_lowest_number() {
    // 50, 25, 12, 6, 3 are all too high; 1 is it
    let (stats, session) = play("1 100\nh\nh\nh\nh\nh\nc\nexit\n");

    assert_eq!(stats.games_won, 1);
    let summary = session.summary().expect("summary");
    assert_eq!(summary.number, 1);
    assert_eq!(summary.total_guesses, 6);
    assert!(summary.total_guesses <= summary.max_expected_guesses);
}
