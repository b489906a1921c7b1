mod common;

use common::*;
use cyber_guardians::game::{GamePhase, Intent, SessionPhase, INITIAL_LIVES};
use cyber_guardians::persist::{FileStore, ManualClock, SnapshotAdapter, SNAPSHOT_EXPIRY};
use std::time::Duration;

#[test]
fn perfect_first_level_unlocks_the_second() {
    let mut game = new_game(7);
    to_level_select(&mut game);
    enter_level(&mut game, 1);

    for answered in 1..=4 {
        let answer = correct_option(&game);
        assert!(game.handle(Intent::AnswerSelect(answer)));
        assert_eq!(game.session().unwrap().score(), 100 * answered);
        game.tick(REVEAL);
    }
    assert_eq!(game.phase(), GamePhase::InLevel(SessionPhase::Completed));
    assert_eq!(game.session().unwrap().completion_score(), Some(400));

    assert!(game.handle(Intent::Continue));
    assert_eq!(game.phase(), GamePhase::LevelSelect);
    assert_eq!(game.user().total_score, 400);
    assert!(game.user().has_completed(1));
    assert_eq!(game.user().current_level, 2);
    assert!(game.levels()[0].is_completed);
    assert_eq!(game.levels()[0].best_score, 400);
    assert!(game.levels()[1].is_unlocked);
    assert!(!game.levels()[2].is_unlocked);
}

#[test]
fn three_wrong_answers_fail_without_progress() {
    let mut game = new_game(8);
    to_level_select(&mut game);
    enter_level(&mut game, 1);

    for _ in 0..2 {
        let answer = wrong_option(&game);
        assert!(game.handle(Intent::AnswerSelect(answer)));
        game.tick(REVEAL);
    }
    let answer = wrong_option(&game);
    assert!(game.handle(Intent::AnswerSelect(answer)));

    let session = game.session().unwrap();
    assert_eq!(game.phase(), GamePhase::InLevel(SessionPhase::Failed));
    assert_eq!(session.lives(), 0);
    assert_eq!(session.pending_tasks(), 0);
    assert!(!game.handle(Intent::Continue));

    assert!(game.handle(Intent::BackToLevels));
    assert_eq!(game.phase(), GamePhase::LevelSelect);
    assert_eq!(game.user().total_score, 0);
    assert_eq!(game.user().completed_count(), 0);
    assert!(!game.levels()[1].is_unlocked);
}

#[test]
fn failed_attempt_can_be_retried_to_completion() {
    let mut game = new_game(9);
    to_level_select(&mut game);
    enter_level(&mut game, 1);

    for _ in 0..3 {
        let answer = wrong_option(&game);
        game.handle(Intent::AnswerSelect(answer));
        game.tick(REVEAL);
    }
    assert_eq!(game.phase(), GamePhase::InLevel(SessionPhase::Failed));

    assert!(game.handle(Intent::Retry));
    assert_eq!(game.phase(), GamePhase::InLevel(SessionPhase::Playing));
    assert_eq!(game.session().unwrap().lives(), INITIAL_LIVES);

    while game.phase() == GamePhase::InLevel(SessionPhase::Playing) {
        let answer = correct_option(&game);
        game.handle(Intent::AnswerSelect(answer));
        game.tick(REVEAL);
    }
    assert!(game.handle(Intent::Continue));
    assert_eq!(game.user().total_score, 400);
    assert!(game.levels()[1].is_unlocked);
}

#[test]
fn leaving_mid_reveal_drops_pending_work() {
    let mut game = new_game(10);
    to_level_select(&mut game);
    enter_level(&mut game, 1);

    let answer = wrong_option(&game);
    assert!(game.handle(Intent::AnswerSelect(answer)));
    assert!(game.session().unwrap().pending_tasks() > 0);

    assert!(game.handle(Intent::BackToLevels));
    assert!(game.session().is_none());
    game.tick(Duration::from_secs(60));
    assert_eq!(game.phase(), GamePhase::LevelSelect);

    // A fresh attempt starts with full lives and nothing carried over
    assert!(game.handle(Intent::SelectLevel(1)));
    let session = game.session().unwrap();
    assert_eq!(session.phase(), SessionPhase::Intro);
    assert_eq!(session.lives(), INITIAL_LIVES);
    assert_eq!(session.score(), 0);
}

#[test]
fn same_seed_gives_same_scenario_order() {
    let order = |seed| {
        let mut game = new_game(seed);
        to_level_select(&mut game);
        enter_level(&mut game, 1);
        game.session()
            .unwrap()
            .scenarios()
            .iter()
            .map(|s| s.id.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(order(1234), order(1234));
}

#[test]
fn full_campaign_earns_every_badge() {
    let mut game = new_game(11);
    to_level_select(&mut game);

    let mut badges_seen = Vec::new();
    for level_id in 1..=7 {
        clear_level(&mut game, level_id);
        if let Some(badge) = game.view().pending_badge {
            badges_seen.push(badge.name.clone());
            assert!(game.handle(Intent::BadgeAnimationComplete));
        }
    }

    assert_eq!(badges_seen, vec!["Survivor", "Warrior", "King"]);
    assert_eq!(game.user().completed_count(), 7);
    assert_eq!(game.user().badges.len(), 3);
    assert_eq!(game.user().current_level, 7);
    assert!(game.levels().iter().all(|l| l.is_completed && l.is_unlocked));
    assert!(game.view().next_badge.is_none());
}

#[test]
fn replaying_a_level_keeps_the_best_score() {
    let mut game = new_game(12);
    to_level_select(&mut game);
    assert_eq!(clear_level(&mut game, 1), 400);

    // Second run: one miss, then correct answers
    enter_level(&mut game, 1);
    let answer = wrong_option(&game);
    game.handle(Intent::AnswerSelect(answer));
    game.tick(REVEAL);
    while game.phase() == GamePhase::InLevel(SessionPhase::Playing) {
        let answer = correct_option(&game);
        game.handle(Intent::AnswerSelect(answer));
        game.tick(REVEAL);
    }
    assert_eq!(game.session().unwrap().completion_score(), Some(300));
    assert!(game.handle(Intent::Continue));

    assert_eq!(game.levels()[0].best_score, 400);
    assert_eq!(game.user().completed_count(), 1);
    assert_eq!(game.user().total_score, 700);
}

#[test]
fn stale_save_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(1_700_000_000_000);
    let store = || Box::new(SnapshotAdapter::new(FileStore::new(dir.path()), clock.clone()));

    let mut game = new_game(13).with_store(store());
    to_level_select(&mut game);
    clear_level(&mut game, 1);

    let resumed = new_game(14).with_store(store());
    assert_eq!(resumed.phase(), GamePhase::Dashboard);
    assert_eq!(resumed.user().total_score, 400);

    clock.advance(SNAPSHOT_EXPIRY);
    let expired = new_game(15).with_store(store());
    assert_eq!(expired.phase(), GamePhase::CharacterSelect);
    assert_eq!(expired.user().total_score, 0);
    assert!(!expired.levels()[1].is_unlocked);
    assert!(!dir.path().join("game_state.json").exists());
}
