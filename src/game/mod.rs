//! Core game logic and state management

pub mod progression;
pub mod selector;
pub mod session;
pub mod timeline;

pub use progression::{ProgressionEngine, ProgressionOutcome};
pub use session::{AnswerOutcome, Mood, Session, SessionPhase, INITIAL_LIVES};

/// Oldest messages are dropped past this many
pub const MESSAGE_LOG_LIMIT: usize = 100;

use crate::config::GameConfig;
use crate::data::*;
use crate::persist::{SavedProgress, Snapshot, SnapshotStore};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the player is in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    CharacterSelect,
    Dashboard,
    LevelSelect,
    InLevel(SessionPhase),
}

impl GamePhase {
    /// Phase a restored game resumes in
    fn resume_point(self) -> GamePhase {
        match self {
            GamePhase::CharacterSelect => GamePhase::CharacterSelect,
            _ => GamePhase::Dashboard,
        }
    }
}

/// Everything the player can ask the game to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectCharacter(CharacterType),
    StartGame,
    SelectLevel(u32),
    DialogueAdvance,
    DialogueSkip,
    AnswerSelect(String),
    Retry,
    /// Bank a completed level and return to level select
    Continue,
    BackToDashboard,
    /// Abandon the current attempt
    BackToLevels,
    ShowTips,
    CloseTips,
    BadgeAnimationComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
}

/// A message to display to the player
#[derive(Debug, Clone)]
pub struct GameMessage {
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub message: String,
}

impl GameMessage {
    pub fn info(message: &str) -> Self {
        Self::new(MessageKind::Info, message)
    }

    pub fn success(message: &str) -> Self {
        Self::new(MessageKind::Success, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(MessageKind::Warning, message)
    }

    fn new(kind: MessageKind, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            message: message.to_string(),
        }
    }
}

/// Read-only picture of the game for rendering
pub struct GameView<'a> {
    pub phase: GamePhase,
    pub user: &'a User,
    pub levels: &'a [Level],
    pub session: Option<&'a Session>,
    pub badges: &'a [Badge],
    pub next_badge: Option<&'a Badge>,
    pub tips: &'a [TipCategory],
    pub show_tips: bool,
    pub pending_badge: Option<&'a Badge>,
    pub last_message: Option<&'a GameMessage>,
}

impl GameView<'_> {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn completed_count(&self) -> usize {
        self.user.completed_count()
    }

    pub fn earned_badge_count(&self) -> usize {
        self.user.badges.len()
    }

    pub fn level(&self, level_id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == level_id)
    }
}

/// The game engine: menus, the active level session, and saved progress
pub struct Game {
    catalog: Arc<Catalog>,
    config: GameConfig,
    progression: ProgressionEngine,
    user: User,
    levels: Vec<Level>,
    session: Option<Session>,
    phase: GamePhase,
    show_tips: bool,
    pending_badge: Option<Badge>,
    message_log: Vec<GameMessage>,
    rng: StdRng,
    store: Option<Box<dyn SnapshotStore>>,
}

impl Game {
    /// A fresh game seeded from system entropy
    pub fn new(catalog: Arc<Catalog>, config: GameConfig) -> Self {
        Self::build(catalog, config, StdRng::from_entropy())
    }

    /// A fresh game whose scenario orders are reproducible
    pub fn with_seed(catalog: Arc<Catalog>, config: GameConfig, seed: u64) -> Self {
        Self::build(catalog, config, StdRng::seed_from_u64(seed))
    }

    fn build(catalog: Arc<Catalog>, config: GameConfig, rng: StdRng) -> Self {
        let progression =
            ProgressionEngine::new(catalog.badges(), config.scoring.total_score_policy);
        let levels = catalog.fresh_levels();

        let mut game = Self {
            catalog,
            config,
            progression,
            user: User::default(),
            levels,
            session: None,
            phase: GamePhase::CharacterSelect,
            show_tips: false,
            pending_badge: None,
            message_log: Vec::new(),
            rng,
            store: None,
        };
        game.add_message(GameMessage::info("Welcome, Cyber Guardian. Choose your character."));
        game
    }

    /// Attach a snapshot store, restoring from it if it holds a usable snapshot
    pub fn with_store(mut self, mut store: Box<dyn SnapshotStore>) -> Self {
        if let Some(snapshot) = store.load() {
            self.restore(snapshot);
        } else {
            info!("no saved progress, starting fresh");
        }
        self.store = Some(store);
        self
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot { progress, levels: saved } = snapshot;

        // Catalog content wins; only progress flags come from the snapshot
        let mut levels = self.catalog.fresh_levels();
        for level in &mut levels {
            if let Some(record) = saved.iter().find(|s| s.id == level.id) {
                level.is_unlocked |= record.is_unlocked;
                level.is_completed = record.is_completed;
                level.best_score = record.best_score;
            }
        }

        let mut user = progress.user;
        user.completed_levels.retain(|id| levels.iter().any(|l| l.id == *id));

        // The user record and the level flags must agree on what is done
        for level in levels.iter().filter(|l| l.is_completed) {
            user.record_completion(level.id);
        }
        for &id in &user.completed_levels {
            if let Some(level) = levels.iter_mut().find(|l| l.id == id) {
                level.is_completed = true;
                level.is_unlocked = true;
            }
            progression::unlock_next_level(&mut levels, id);
        }
        user.current_level = user.current_level.clamp(1, self.catalog.max_level_id().max(1));
        self.progression.refresh_badges(&mut user);

        info!(
            user = %user.name,
            completed = user.completed_count(),
            score = user.total_score,
            "progress restored"
        );
        self.user = user;
        self.levels = levels;
        self.phase = progress.phase.resume_point();
        self.add_message(GameMessage::info("Welcome back! Your progress has been restored."));
    }

    /// Apply a player intent; returns false if it does not apply right now
    pub fn handle(&mut self, intent: Intent) -> bool {
        debug!(?intent, phase = ?self.phase, "intent");
        let accepted = match intent {
            Intent::SelectCharacter(character) => self.select_character(character),
            Intent::StartGame => self.menu_transition(GamePhase::Dashboard, GamePhase::LevelSelect),
            Intent::SelectLevel(level_id) => self.select_level(level_id),
            Intent::DialogueAdvance => self.with_session(|s, _| s.dialogue_advance()),
            Intent::DialogueSkip => self.with_session(|s, _| s.dialogue_skip()),
            Intent::AnswerSelect(option_id) => self.with_session(|s, _| s.select_answer(&option_id)),
            Intent::Retry => self.with_session(|s, rng| s.retry(rng)),
            Intent::Continue => self.continue_after_completion(),
            Intent::BackToDashboard => self.back_to_dashboard(),
            Intent::BackToLevels => self.back_to_levels(),
            Intent::ShowTips => self.set_tips(true),
            Intent::CloseTips => self.set_tips(false),
            Intent::BadgeAnimationComplete => self.pending_badge.take().is_some(),
        };
        self.sync_phase();
        accepted
    }

    /// Advance the active session's logical clock
    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(session) = self.session.as_mut() {
            session.tick(elapsed);
        }
        self.sync_phase();
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            phase: self.phase,
            user: &self.user,
            levels: &self.levels,
            session: self.session.as_ref(),
            badges: self.catalog.badges(),
            next_badge: self.progression.next_badge(&self.user),
            tips: self.catalog.tips(),
            show_tips: self.show_tips,
            pending_badge: self.pending_badge.as_ref(),
            last_message: self.message_log.last(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn message_log(&self) -> &[GameMessage] {
        &self.message_log
    }

    pub fn add_message(&mut self, message: GameMessage) {
        if self.message_log.len() >= MESSAGE_LOG_LIMIT {
            self.message_log.remove(0);
        }
        self.message_log.push(message);
    }

    // ---------------------------------------------------------------------
    // Intent handlers
    // ---------------------------------------------------------------------

    fn select_character(&mut self, character: CharacterType) -> bool {
        if self.phase != GamePhase::CharacterSelect {
            return false;
        }
        self.user.selected_character = character;
        self.phase = GamePhase::Dashboard;
        info!(character = %character, "character selected");
        self.add_message(GameMessage::info(&format!("Playing as {}.", character.name())));
        self.persist();
        true
    }

    fn menu_transition(&mut self, from: GamePhase, to: GamePhase) -> bool {
        if self.phase != from {
            return false;
        }
        self.phase = to;
        self.show_tips = false;
        self.persist();
        true
    }

    fn select_level(&mut self, level_id: u32) -> bool {
        if self.phase != GamePhase::LevelSelect {
            return false;
        }
        let Some(level) = self.levels.iter().find(|l| l.id == level_id) else {
            debug!(level = level_id, "unknown level selected");
            return false;
        };
        if !level.is_unlocked {
            debug!(level = level_id, "locked level selected");
            return false;
        }

        let pool = self.catalog.scenario_pool(level_id);
        let session = Session::start(
            level,
            pool,
            self.config.session.scenario_limit(),
            self.config.timing.clone(),
            &mut self.rng,
        );
        self.show_tips = false;
        self.session = Some(session);
        true
    }

    fn with_session(&mut self, f: impl FnOnce(&mut Session, &mut StdRng) -> bool) -> bool {
        match self.session.as_mut() {
            Some(session) => f(session, &mut self.rng),
            None => false,
        }
    }

    fn continue_after_completion(&mut self) -> bool {
        let Some((level_id, score)) = self
            .session
            .as_ref()
            .and_then(|s| Some((s.level_id(), s.completion_score()?)))
        else {
            return false;
        };
        self.session = None;

        match self
            .progression
            .complete_level(&mut self.levels, &mut self.user, level_id, score)
        {
            Ok(outcome) => {
                self.add_message(GameMessage::success(&format!(
                    "Level {level_id} complete! +{score} points"
                )));
                if let Some(next) = outcome.unlocked {
                    self.add_message(GameMessage::info(&format!("Level {next} unlocked.")));
                }
                if let Some(badge) = outcome.newly_earned {
                    self.add_message(GameMessage::success(&format!(
                        "Badge earned: {}",
                        badge.name
                    )));
                    self.pending_badge = Some(badge);
                }
            }
            Err(e) => warn!(level = level_id, error = %e, "completion ignored"),
        }

        self.phase = GamePhase::LevelSelect;
        self.persist();
        true
    }

    fn back_to_dashboard(&mut self) -> bool {
        match self.phase {
            GamePhase::LevelSelect => {}
            GamePhase::InLevel(phase) if phase != SessionPhase::Completed => self.abandon_session(),
            _ => return false,
        }
        self.phase = GamePhase::Dashboard;
        self.persist();
        true
    }

    fn back_to_levels(&mut self) -> bool {
        match self.phase {
            GamePhase::InLevel(phase) if phase != SessionPhase::Completed => {
                self.abandon_session();
                self.phase = GamePhase::LevelSelect;
                true
            }
            _ => false,
        }
    }

    /// Drop the active session; its pending timeline tasks go with it
    fn abandon_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                level = session.level_id(),
                phase = ?session.phase(),
                "level session abandoned"
            );
        }
    }

    fn set_tips(&mut self, show: bool) -> bool {
        if show && !matches!(self.phase, GamePhase::Dashboard | GamePhase::LevelSelect) {
            return false;
        }
        if self.show_tips == show {
            return false;
        }
        self.show_tips = show;
        true
    }

    fn sync_phase(&mut self) {
        if let Some(session) = &self.session {
            self.phase = GamePhase::InLevel(session.phase());
        }
    }

    /// Best-effort save of long-lived state
    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let snapshot = Snapshot {
            progress: SavedProgress {
                user: self.user.clone(),
                phase: self.phase,
            },
            levels: self.levels.clone(),
        };
        if let Err(e) = store.save(&snapshot) {
            warn!(error = %e, "failed to save progress");
            self.add_message(GameMessage::warning("Progress could not be saved."));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{FileStore, ManualClock, MemoryStore, SnapshotAdapter};

    fn game() -> Game {
        Game::with_seed(Arc::new(Catalog::standard()), GameConfig::default(), 42)
    }

    fn adapter(dir: &std::path::Path) -> Box<dyn SnapshotStore> {
        Box::new(SnapshotAdapter::new(
            FileStore::new(dir),
            ManualClock::new(1_000_000),
        ))
    }

    fn enter_level_select(game: &mut Game) {
        assert!(game.handle(Intent::SelectCharacter(CharacterType::Intern)));
        assert!(game.handle(Intent::StartGame));
        assert_eq!(game.phase(), GamePhase::LevelSelect);
    }

    fn play_level_perfectly(game: &mut Game, level_id: u32) {
        assert!(game.handle(Intent::SelectLevel(level_id)));
        assert!(game.handle(Intent::DialogueSkip));
        game.tick(Duration::from_millis(500));
        while game.phase() == GamePhase::InLevel(SessionPhase::Playing) {
            let answer = game.session().unwrap().current_scenario().unwrap().correct_answer.clone();
            assert!(game.handle(Intent::AnswerSelect(answer)));
            game.tick(Duration::from_millis(3000));
        }
        assert_eq!(game.phase(), GamePhase::InLevel(SessionPhase::Completed));
        assert!(game.handle(Intent::Continue));
    }

    #[test]
    fn menus_follow_the_phase_graph() {
        let mut game = game();
        assert_eq!(game.phase(), GamePhase::CharacterSelect);
        assert!(!game.handle(Intent::StartGame));

        assert!(game.handle(Intent::SelectCharacter(CharacterType::Cyberbot)));
        assert_eq!(game.user().selected_character, CharacterType::Cyberbot);
        assert_eq!(game.phase(), GamePhase::Dashboard);
        assert!(!game.handle(Intent::SelectCharacter(CharacterType::Student)));

        assert!(game.handle(Intent::StartGame));
        assert!(game.handle(Intent::BackToDashboard));
        assert_eq!(game.phase(), GamePhase::Dashboard);
    }

    #[test]
    fn locked_and_unknown_levels_are_ignored() {
        let mut game = game();
        enter_level_select(&mut game);
        assert!(!game.handle(Intent::SelectLevel(2)));
        assert!(!game.handle(Intent::SelectLevel(42)));
        assert_eq!(game.phase(), GamePhase::LevelSelect);
        assert!(game.handle(Intent::SelectLevel(1)));
        assert_eq!(game.phase(), GamePhase::InLevel(SessionPhase::Intro));
    }

    #[test]
    fn tips_only_open_from_menus() {
        let mut game = game();
        assert!(!game.handle(Intent::ShowTips));
        game.handle(Intent::SelectCharacter(CharacterType::Student));
        assert!(game.handle(Intent::ShowTips));
        assert!(game.view().show_tips);
        assert!(!game.handle(Intent::ShowTips));
        assert!(game.handle(Intent::CloseTips));
        assert!(!game.view().show_tips);
    }

    #[test]
    fn third_level_raises_badge_notification() {
        let mut game = game();
        enter_level_select(&mut game);
        for id in 1..=3 {
            play_level_perfectly(&mut game, id);
        }
        let view = game.view();
        assert_eq!(view.pending_badge.map(|b| b.name.as_str()), Some("Survivor"));
        assert_eq!(view.earned_badge_count(), 1);
        assert_eq!(view.next_badge.map(|b| b.name.as_str()), Some("Warrior"));

        assert!(game.handle(Intent::BadgeAnimationComplete));
        assert!(!game.handle(Intent::BadgeAnimationComplete));
    }

    #[test]
    fn progress_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(Catalog::standard());

        let mut first = Game::with_seed(catalog.clone(), GameConfig::default(), 1)
            .with_store(adapter(dir.path()));
        enter_level_select(&mut first);
        play_level_perfectly(&mut first, 1);
        let score = first.user().total_score;
        assert_eq!(score, 400);

        let second =
            Game::with_seed(catalog, GameConfig::default(), 2).with_store(adapter(dir.path()));
        assert_eq!(second.phase(), GamePhase::Dashboard);
        assert_eq!(second.user().total_score, score);
        assert_eq!(second.user().selected_character, CharacterType::Intern);
        assert!(second.levels()[1].is_unlocked);
        assert_eq!(second.levels()[0].best_score, 400);
        assert!(second.view().pending_badge.is_none());
    }

    #[test]
    fn corrupt_save_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game_state.json"), "garbage").unwrap();
        std::fs::write(dir.path().join("levels.json"), "[]").unwrap();
        std::fs::write(dir.path().join("timestamp.json"), "1000000").unwrap();

        let game = game().with_store(adapter(dir.path()));
        assert_eq!(game.phase(), GamePhase::CharacterSelect);
        assert_eq!(game.user().total_score, 0);
    }

    #[test]
    fn restore_reconciles_user_and_level_flags() {
        let catalog = Arc::new(Catalog::standard());
        let mut user = User::new("Sam");
        user.selected_character = CharacterType::Student;
        user.record_completion(1);
        let mut levels = catalog.fresh_levels();
        levels[1].is_completed = true;

        let mut store = SnapshotAdapter::new(MemoryStore::new(), ManualClock::new(0));
        store
            .save(&Snapshot {
                progress: SavedProgress { user, phase: GamePhase::Dashboard },
                levels,
            })
            .unwrap();

        let game = Game::with_seed(catalog, GameConfig::default(), 3).with_store(Box::new(store));
        let completed: Vec<u32> = game.user().completed_levels.iter().copied().collect();
        assert_eq!(completed, vec![1, 2]);
        assert!(game.levels()[0].is_completed);
        assert!(game.levels()[1].is_unlocked);
        assert!(game.levels()[2].is_unlocked);
        assert!(!game.levels()[3].is_unlocked);
    }

    #[test]
    fn message_log_keeps_only_recent_entries() {
        let mut game = game();
        for i in 0..MESSAGE_LOG_LIMIT + 20 {
            game.add_message(GameMessage::info(&format!("message {i}")));
        }
        assert_eq!(game.message_log().len(), MESSAGE_LOG_LIMIT);
        assert_eq!(game.message_log().last().map(|m| m.message.as_str()), Some("message 119"));
    }
}
