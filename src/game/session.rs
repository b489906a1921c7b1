//! A single attempt at a level
//!
//! `Intro → Playing → {Completed | Failed}`. The session owns its timeline,
//! so reveal delays and flavor popups die with it when the player leaves.

use super::selector::select_session_limited;
use super::timeline::{TaskHandle, Timeline};
use crate::config::TimingConfig;
use crate::data::{Level, Scenario};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Lives at the start of every attempt
pub const INITIAL_LIVES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Intro,
    Playing,
    Completed,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

/// Expression for the player's character portrait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Neutral,
    Thinking,
    Happy,
    Concerned,
    Confident,
}

/// What happened when the player answered the current scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub scenario_id: String,
    pub option_id: String,
    pub correct: bool,
    pub points_awarded: u32,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    FinishIntro,
    ShowThought,
    HideThreatPopup,
    Advance,
}

#[derive(Debug, Clone)]
pub struct Session {
    level_id: u32,
    intro_dialogue: Vec<String>,
    pool: Vec<Scenario>,
    limit: Option<usize>,
    timing: TimingConfig,

    phase: SessionPhase,
    dialogue_index: usize,
    intro_exit: Option<TaskHandle>,

    scenarios: Vec<Scenario>,
    index: usize,
    score: u32,
    lives: u8,
    correct_answers: u32,
    outcome: Option<AnswerOutcome>,

    threat_popup: bool,
    thought_visible: bool,
    mood: Mood,
    thought_task: Option<TaskHandle>,
    popup_task: Option<TaskHandle>,

    timeline: Timeline<SessionTask>,
}

impl Session {
    /// Open a level at its intro with a freshly shuffled scenario order
    pub fn start<R: Rng + ?Sized>(
        level: &Level,
        pool: &[Scenario],
        limit: Option<usize>,
        timing: TimingConfig,
        rng: &mut R,
    ) -> Self {
        let scenarios = select_session_limited(pool, limit, rng);
        info!(level = level.id, scenarios = scenarios.len(), "level session started");

        Self {
            level_id: level.id,
            intro_dialogue: level.intro_dialogue.clone(),
            pool: pool.to_vec(),
            limit,
            timing,
            phase: SessionPhase::Intro,
            dialogue_index: 0,
            intro_exit: None,
            scenarios,
            index: 0,
            score: 0,
            lives: INITIAL_LIVES,
            correct_answers: 0,
            outcome: None,
            threat_popup: false,
            thought_visible: false,
            mood: Mood::Neutral,
            thought_task: None,
            popup_task: None,
            timeline: Timeline::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Intents
    // ---------------------------------------------------------------------

    /// Show the next intro line, or leave the intro after the last one
    pub fn dialogue_advance(&mut self) -> bool {
        if self.phase != SessionPhase::Intro || self.intro_exit.is_some() {
            return false;
        }
        if self.dialogue_index + 1 < self.intro_dialogue.len() {
            self.dialogue_index += 1;
        } else {
            self.leave_intro();
        }
        true
    }

    /// Leave the intro from any line
    pub fn dialogue_skip(&mut self) -> bool {
        if self.phase != SessionPhase::Intro || self.intro_exit.is_some() {
            return false;
        }
        self.leave_intro();
        true
    }

    /// Answer the current scenario.
    ///
    /// Rejected outside Playing, while the previous answer is still being
    /// revealed, or for an option the scenario does not offer.
    pub fn select_answer(&mut self, option_id: &str) -> bool {
        if self.phase != SessionPhase::Playing || self.outcome.is_some() {
            return false;
        }
        let Some(scenario) = self.scenarios.get(self.index) else {
            return false;
        };
        if scenario.option(option_id).is_none() {
            return false;
        }

        let correct = scenario.is_correct(option_id);
        let points_awarded = if correct { scenario.points } else { 0 };
        let outcome = AnswerOutcome {
            scenario_id: scenario.id.clone(),
            option_id: option_id.to_string(),
            correct,
            points_awarded,
            explanation: scenario.explanation.clone(),
        };

        if let Some(handle) = self.thought_task.take() {
            self.timeline.cancel(handle);
        }
        self.thought_visible = false;

        if correct {
            self.score += points_awarded;
            self.correct_answers += 1;
            self.mood = Mood::Happy;
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.mood = Mood::Concerned;
        }
        debug!(
            level = self.level_id,
            scenario = %outcome.scenario_id,
            correct,
            score = self.score,
            lives = self.lives,
            "answer recorded"
        );
        self.outcome = Some(outcome);

        if self.lives == 0 {
            self.fail();
        } else {
            self.timeline
                .schedule(self.timing.reveal_delay(), SessionTask::Advance);
            self.run_due();
        }
        true
    }

    /// Start over from a finished attempt with a new order, score and lives
    pub fn retry<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.phase.is_terminal() {
            return false;
        }
        self.cancel_pending();

        self.scenarios = select_session_limited(&self.pool, self.limit, rng);
        self.index = 0;
        self.score = 0;
        self.lives = INITIAL_LIVES;
        self.correct_answers = 0;
        self.outcome = None;
        self.mood = Mood::Neutral;
        self.threat_popup = false;
        self.thought_visible = false;

        info!(level = self.level_id, "level session retried");
        self.begin_playing();
        true
    }

    /// Move the session clock forward, firing whatever falls due
    pub fn tick(&mut self, elapsed: Duration) {
        let until = self.timeline.now() + elapsed;
        while let Some((_, task)) = self.timeline.pop_due(until) {
            self.apply(task);
        }
        self.timeline.advance_to(until);
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    fn leave_intro(&mut self) {
        let handle = self
            .timeline
            .schedule(self.timing.intro_exit_delay(), SessionTask::FinishIntro);
        self.intro_exit = Some(handle);
        self.run_due();
    }

    fn begin_playing(&mut self) {
        self.phase = SessionPhase::Playing;
        if self.scenarios.is_empty() {
            self.complete();
        } else {
            self.load_scenario();
        }
    }

    fn load_scenario(&mut self) {
        for handle in [self.thought_task.take(), self.popup_task.take()].into_iter().flatten() {
            self.timeline.cancel(handle);
        }
        self.outcome = None;
        self.mood = Mood::Thinking;
        self.threat_popup = true;
        self.thought_visible = false;

        self.thought_task = Some(
            self.timeline
                .schedule(self.timing.thought_delay(), SessionTask::ShowThought),
        );
        self.popup_task = Some(
            self.timeline
                .schedule(self.timing.threat_popup(), SessionTask::HideThreatPopup),
        );
    }

    fn complete(&mut self) {
        self.phase = SessionPhase::Completed;
        self.mood = Mood::Confident;
        self.threat_popup = false;
        self.thought_visible = false;
        self.cancel_pending();
        info!(level = self.level_id, score = self.score, "level session completed");
    }

    fn fail(&mut self) {
        self.phase = SessionPhase::Failed;
        self.threat_popup = false;
        self.thought_visible = false;
        self.cancel_pending();
        info!(level = self.level_id, score = self.score, "level session failed");
    }

    fn cancel_pending(&mut self) {
        self.timeline.cancel_all();
        self.thought_task = None;
        self.popup_task = None;
        self.intro_exit = None;
    }

    fn run_due(&mut self) {
        self.tick(Duration::ZERO);
    }

    fn apply(&mut self, task: SessionTask) {
        debug!(level = self.level_id, ?task, "session task fired");
        match task {
            SessionTask::FinishIntro => {
                self.intro_exit = None;
                self.begin_playing();
            }
            SessionTask::ShowThought => {
                self.thought_task = None;
                self.thought_visible = true;
            }
            SessionTask::HideThreatPopup => {
                self.popup_task = None;
                self.threat_popup = false;
            }
            SessionTask::Advance => {
                if self.index + 1 < self.scenarios.len() {
                    self.index += 1;
                    self.load_scenario();
                } else {
                    self.complete();
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // View
    // ---------------------------------------------------------------------

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn dialogue_index(&self) -> usize {
        self.dialogue_index
    }

    pub fn dialogue_len(&self) -> usize {
        self.intro_dialogue.len()
    }

    pub fn current_dialogue(&self) -> Option<&str> {
        self.intro_dialogue.get(self.dialogue_index).map(String::as_str)
    }

    pub fn is_leaving_intro(&self) -> bool {
        self.intro_exit.is_some()
    }

    /// The presentation order for this attempt
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn scenario_index(&self) -> usize {
        self.index
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    pub fn current_scenario(&self) -> Option<&Scenario> {
        match self.phase {
            SessionPhase::Playing | SessionPhase::Failed => self.scenarios.get(self.index),
            _ => None,
        }
    }

    /// Result of the last answer while its explanation is on screen
    pub fn outcome(&self) -> Option<&AnswerOutcome> {
        self.outcome.as_ref()
    }

    pub fn show_explanation(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn threat_popup_visible(&self) -> bool {
        self.threat_popup
    }

    /// The character's thought about the current scenario, once revealed
    pub fn thought(&self) -> Option<&str> {
        if !self.thought_visible {
            return None;
        }
        self.current_scenario()
            .and_then(|s| s.character_thought.as_deref())
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// Share of presented scenarios answered correctly, 0-100
    pub fn accuracy_percent(&self) -> u32 {
        if self.scenarios.is_empty() {
            return 0;
        }
        let ratio = self.correct_answers as f64 / self.scenarios.len() as f64;
        (ratio * 100.0).round() as u32
    }

    pub fn is_perfect(&self) -> bool {
        self.phase == SessionPhase::Completed
            && self.correct_answers as usize == self.scenarios.len()
    }

    /// Final score, only for a successful run
    pub fn completion_score(&self) -> Option<u32> {
        (self.phase == SessionPhase::Completed).then_some(self.score)
    }

    pub fn pending_tasks(&self) -> usize {
        self.timeline.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{reference_levels, ScenarioContent, ScenarioKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scenario(id: &str, points: u32) -> Scenario {
        Scenario::new(
            id,
            ScenarioKind::Email,
            ScenarioContent::default(),
            &[("right", "Right"), ("wrong", "Wrong")],
            "right",
            "explained",
            points,
        )
        .with_thought("hmm")
    }

    fn start(pool: &[Scenario]) -> Session {
        let level = &reference_levels()[0];
        let mut rng = StdRng::seed_from_u64(11);
        Session::start(level, pool, None, TimingConfig::default(), &mut rng)
    }

    fn playing(pool: &[Scenario]) -> Session {
        let mut session = start(pool);
        assert!(session.dialogue_skip());
        session.tick(ms(500));
        assert_eq!(session.phase(), SessionPhase::Playing);
        session
    }

    #[test]
    fn intro_walks_dialogue_then_waits_before_playing() {
        let mut session = start(&[scenario("a", 100)]);
        let lines = session.dialogue_len();
        assert_eq!(lines, 4);

        for expected in 1..lines {
            assert!(session.dialogue_advance());
            assert_eq!(session.dialogue_index(), expected);
        }
        assert!(session.dialogue_advance());
        assert!(session.is_leaving_intro());
        assert!(!session.dialogue_advance());
        assert!(!session.dialogue_skip());

        session.tick(ms(499));
        assert_eq!(session.phase(), SessionPhase::Intro);
        session.tick(ms(1));
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.lives(), INITIAL_LIVES);
    }

    #[test]
    fn correct_answer_scores_and_advances_after_reveal() {
        let mut session = playing(&[scenario("a", 100), scenario("b", 100)]);
        let first = session.current_scenario().unwrap().id.clone();

        assert!(session.select_answer("right"));
        assert_eq!(session.score(), 100);
        assert!(session.show_explanation());
        assert!(session.outcome().unwrap().correct);
        assert_eq!(session.mood(), Mood::Happy);

        session.tick(ms(2999));
        assert_eq!(session.current_scenario().unwrap().id, first);
        session.tick(ms(1));
        assert_ne!(session.current_scenario().unwrap().id, first);
        assert!(!session.show_explanation());
    }

    #[test]
    fn answers_are_rejected_while_explanation_shows() {
        let mut session = playing(&[scenario("a", 100), scenario("b", 100)]);
        assert!(session.select_answer("wrong"));
        assert!(!session.select_answer("right"));
        assert!(!session.select_answer("wrong"));
        assert_eq!(session.lives(), INITIAL_LIVES - 1);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut session = playing(&[scenario("a", 100)]);
        assert!(!session.select_answer("nope"));
        assert_eq!(session.lives(), INITIAL_LIVES);
        assert!(!session.show_explanation());
    }

    #[test]
    fn last_life_fails_immediately_and_cancels_advance() {
        let pool: Vec<Scenario> = (0..5).map(|i| scenario(&format!("s{i}"), 100)).collect();
        let mut session = playing(&pool);

        for _ in 0..2 {
            assert!(session.select_answer("wrong"));
            session.tick(ms(3000));
        }
        assert!(session.select_answer("wrong"));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert_eq!(session.lives(), 0);
        assert_eq!(session.pending_tasks(), 0);
        assert_eq!(session.completion_score(), None);

        session.tick(ms(10_000));
        assert_eq!(session.scenario_index(), 2);
        assert!(!session.select_answer("right"));
    }

    #[test]
    fn empty_pool_completes_immediately_with_zero() {
        let mut session = start(&[]);
        session.dialogue_skip();
        session.tick(ms(500));
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(session.completion_score(), Some(0));
        assert!(!session.select_answer("right"));
    }

    #[test]
    fn retry_resets_and_reshuffles_from_terminal_phases_only() {
        let pool: Vec<Scenario> = (0..3).map(|i| scenario(&format!("s{i}"), 50)).collect();
        let mut session = playing(&pool);
        let mut rng = StdRng::seed_from_u64(99);
        assert!(!session.retry(&mut rng));

        for _ in 0..3 {
            session.select_answer("right");
            session.tick(ms(3000));
        }
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(session.completion_score(), Some(150));
        assert!(session.is_perfect());
        assert_eq!(session.accuracy_percent(), 100);

        assert!(session.retry(&mut rng));
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.lives(), INITIAL_LIVES);
        assert_eq!(session.scenario_index(), 0);
        assert_eq!(session.scenario_count(), 3);
    }

    #[test]
    fn flavor_popups_follow_their_delays() {
        let mut session = playing(&[scenario("a", 100)]);
        assert!(session.threat_popup_visible());
        assert_eq!(session.thought(), None);
        assert_eq!(session.mood(), Mood::Thinking);

        session.tick(ms(1000));
        assert_eq!(session.thought(), Some("hmm"));
        session.tick(ms(2000));
        assert!(!session.threat_popup_visible());
    }

    #[test]
    fn answering_cancels_pending_thought() {
        let mut session = playing(&[scenario("a", 100), scenario("b", 100)]);
        session.select_answer("right");
        session.tick(ms(1500));
        assert_eq!(session.thought(), None);
        assert!(session.threat_popup_visible());
    }

    #[test]
    fn limit_caps_presented_scenarios() {
        let pool: Vec<Scenario> = (0..4).map(|i| scenario(&format!("s{i}"), 10)).collect();
        let level = &reference_levels()[0];
        let mut rng = StdRng::seed_from_u64(5);
        let session = Session::start(level, &pool, Some(2), TimingConfig::default(), &mut rng);
        assert_eq!(session.scenario_count(), 2);
    }
}
