use cyber_guardians::config::GameConfig;
use cyber_guardians::game::{GamePhase, Intent, SessionPhase};
use cyber_guardians::{CharacterType, Catalog, Game};
use std::sync::Arc;
use std::time::Duration;

pub const REVEAL: Duration = Duration::from_millis(3000);
pub const INTRO_EXIT: Duration = Duration::from_millis(500);

pub fn new_game(seed: u64) -> Game {
    Game::with_seed(Arc::new(Catalog::standard()), GameConfig::default(), seed)
}

/// Pick a character and open the level list
pub fn to_level_select(game: &mut Game) {
    assert!(game.handle(Intent::SelectCharacter(CharacterType::Student)));
    assert!(game.handle(Intent::StartGame));
}

/// Enter a level and skip straight to the first scenario
pub fn enter_level(game: &mut Game, level_id: u32) {
    assert!(game.handle(Intent::SelectLevel(level_id)));
    assert!(game.handle(Intent::DialogueSkip));
    game.tick(INTRO_EXIT);
    assert_eq!(game.phase(), GamePhase::InLevel(SessionPhase::Playing));
}

pub fn correct_option(game: &Game) -> String {
    let scenario = game.session().unwrap().current_scenario().unwrap();
    scenario.correct_answer.clone()
}

pub fn wrong_option(game: &Game) -> String {
    let scenario = game.session().unwrap().current_scenario().unwrap();
    scenario
        .options
        .iter()
        .find(|o| !o.is_correct)
        .map(|o| o.id.clone())
        .unwrap()
}

/// Answer every scenario correctly and bank the result
pub fn clear_level(game: &mut Game, level_id: u32) -> u32 {
    enter_level(game, level_id);
    while game.phase() == GamePhase::InLevel(SessionPhase::Playing) {
        let answer = correct_option(game);
        assert!(game.handle(Intent::AnswerSelect(answer)));
        game.tick(REVEAL);
    }
    let score = game.session().unwrap().completion_score().unwrap();
    assert!(game.handle(Intent::Continue));
    score
}
