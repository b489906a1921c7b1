//! Main application state and rendering

use crate::data::{CharacterType, Scenario};
use crate::game::{Game, GamePhase, GameView, Intent, Mood, Session, SessionPhase, INITIAL_LIVES};
use crate::tui::widgets::{DramaticBox, LivesIndicator, ProgressBar, ThreatAlert};
use crate::tui::{centered_rect, hex_color, message_color, styled_block, Theme, HELP_TEXT, LOGO, SMALL_LOGO};
use crate::tui::{create_content_layout, create_main_area_layout, create_main_layout};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

/// Application state
pub struct App {
    pub game: Game,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub menu_state: ListState,
    /// Phase and scenario the current list selection belongs to
    selection_anchor: (GamePhase, usize),
}

impl App {
    pub fn new(game: Game) -> Self {
        let mut app = Self {
            selection_anchor: (game.phase(), 0),
            game,
            theme: Theme::default(),
            running: true,
            show_help: false,
            menu_state: ListState::default(),
        };
        app.reset_selection();
        app
    }

    /// Wait up to `timeout` for a key and apply it; returns false once quitting
    pub fn handle_input(&mut self, timeout: Duration) -> std::io::Result<bool> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(self.running)
    }

    /// Feed wall-clock time to the game
    pub fn tick(&mut self, elapsed: Duration) {
        self.game.tick(elapsed);
        self.sync_selection();
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.show_help {
            if matches!(code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up => self.navigate_up(),
            KeyCode::Down => self.navigate_down(),
            _ => {
                if let Some(intent) = self.intent_for(code) {
                    self.game.handle(intent);
                }
            }
        }
        self.sync_selection();
    }

    /// The intent a key maps to in the current phase
    fn intent_for(&self, code: KeyCode) -> Option<Intent> {
        let view = self.game.view();

        if view.pending_badge.is_some() {
            return matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' '))
                .then_some(Intent::BadgeAnimationComplete);
        }
        if view.show_tips {
            return matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('t'))
                .then_some(Intent::CloseTips);
        }

        let selected = self.menu_state.selected().unwrap_or(0);
        match (view.phase, code) {
            (GamePhase::CharacterSelect, KeyCode::Enter) => {
                CharacterType::ALL.get(selected).copied().map(Intent::SelectCharacter)
            }
            (GamePhase::Dashboard, KeyCode::Enter | KeyCode::Char('p')) => Some(Intent::StartGame),
            (GamePhase::Dashboard | GamePhase::LevelSelect, KeyCode::Char('t')) => Some(Intent::ShowTips),
            (GamePhase::LevelSelect, KeyCode::Enter) => {
                view.levels.get(selected).map(|l| Intent::SelectLevel(l.id))
            }
            (GamePhase::LevelSelect, KeyCode::Esc) => Some(Intent::BackToDashboard),

            (GamePhase::InLevel(SessionPhase::Intro), KeyCode::Enter | KeyCode::Char(' ')) => {
                Some(Intent::DialogueAdvance)
            }
            (GamePhase::InLevel(SessionPhase::Intro), KeyCode::Char('s')) => Some(Intent::DialogueSkip),
            (GamePhase::InLevel(SessionPhase::Playing), KeyCode::Enter) => {
                option_id(&view, selected).map(Intent::AnswerSelect)
            }
            (GamePhase::InLevel(SessionPhase::Playing), KeyCode::Char(c)) if c.is_ascii_digit() => {
                let index = (c.to_digit(10)? as usize).checked_sub(1)?;
                option_id(&view, index).map(Intent::AnswerSelect)
            }
            (GamePhase::InLevel(SessionPhase::Completed), KeyCode::Enter) => Some(Intent::Continue),
            (GamePhase::InLevel(SessionPhase::Completed | SessionPhase::Failed), KeyCode::Char('r')) => {
                Some(Intent::Retry)
            }
            (GamePhase::InLevel(SessionPhase::Failed), KeyCode::Enter) => Some(Intent::Retry),
            (GamePhase::InLevel(_), KeyCode::Esc) => Some(Intent::BackToLevels),
            _ => None,
        }
    }

    fn item_count(&self) -> usize {
        let view = self.game.view();
        match view.phase {
            GamePhase::CharacterSelect => CharacterType::ALL.len(),
            GamePhase::LevelSelect => view.levels.len(),
            GamePhase::InLevel(SessionPhase::Playing) => view
                .session
                .and_then(Session::current_scenario)
                .map_or(0, |s| s.options.len()),
            _ => 0,
        }
    }

    fn navigate_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        if i > 0 {
            self.menu_state.select(Some(i - 1));
        }
    }

    fn navigate_down(&mut self) {
        let max = self.item_count().saturating_sub(1);
        let i = self.menu_state.selected().unwrap_or(0);
        if i < max {
            self.menu_state.select(Some(i + 1));
        }
    }

    fn sync_selection(&mut self) {
        let anchor = (
            self.game.phase(),
            self.game.session().map_or(0, Session::scenario_index),
        );
        if anchor != self.selection_anchor {
            self.selection_anchor = anchor;
            self.reset_selection();
        }
    }

    fn reset_selection(&mut self) {
        let start = match self.game.phase() {
            // Land on the furthest level reached
            GamePhase::LevelSelect => {
                let current = self.game.user().current_level;
                self.game
                    .levels()
                    .iter()
                    .position(|l| l.id == current)
                    .unwrap_or(0)
            }
            _ => 0,
        };
        self.menu_state.select(Some(start));
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame) {
        match self.game.phase() {
            GamePhase::CharacterSelect => self.render_character_select(frame),
            GamePhase::Dashboard => self.render_dashboard(frame),
            GamePhase::LevelSelect => self.render_level_select(frame),
            GamePhase::InLevel(_) => self.render_level(frame),
        }

        let view = self.game.view();
        if view.show_tips {
            self.render_tips_overlay(frame, &view);
        }
        if view.pending_badge.is_some() {
            self.render_badge_overlay(frame, &view);
        }
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_character_select(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        // Skip the big logo on small terminals
        let logo_height = if area.height < 30 { 2 } else { LOGO.lines().count() as u16 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(logo_height),
                Constraint::Min(9),
                Constraint::Length(1),
            ])
            .split(area);

        let logo = if area.height < 30 { "═══ CYBER GUARDIANS ═══" } else { LOGO };
        frame.render_widget(
            Paragraph::new(logo)
                .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center),
            chunks[0],
        );

        let items: Vec<ListItem> = CharacterType::ALL
            .iter()
            .map(|character| {
                ListItem::new(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("  {}  {}", character.symbol(), character.name()),
                        Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("      {}", character.description()),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(styled_block("Choose Your Guardian", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, chunks[1], &mut self.menu_state);

        let footer = Paragraph::new("↑/↓ to select, Enter to confirm, ? for help, q to quit")
            .style(Style::default().fg(self.theme.border))
            .alignment(Alignment::Center);
        frame.render_widget(footer, chunks[2]);
    }

    fn render_dashboard(&mut self, frame: &mut Frame) {
        let view = self.game.view();
        let layout = create_main_layout(frame.area());
        self.render_header(
            frame,
            layout[0],
            &format!("Welcome, {}", view.user.name),
            &format!("{} {}", view.user.selected_character.symbol(), view.user.selected_character.name()),
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        // Progress
        let block = styled_block("Progress", &self.theme);
        let inner = block.inner(columns[0]);
        frame.render_widget(block, columns[0]);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(inner);

        let score = Paragraph::new(vec![
            Line::from(vec![
                Span::raw("Total score: "),
                Span::styled(
                    view.user.total_score.to_string(),
                    Style::default().fg(self.theme.warning).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!(
                "Campaign: {}% complete",
                view.user.completion_percent(view.level_count())
            )),
        ]);
        frame.render_widget(score, rows[0]);
        frame.render_widget(
            ProgressBar::new("Levels", view.completed_count() as u32, view.level_count() as u32)
                .color(self.theme.success),
            rows[1],
        );
        frame.render_widget(
            ProgressBar::new("Badges", view.earned_badge_count() as u32, view.badges.len() as u32)
                .color(self.theme.header),
            rows[3],
        );

        let next = match view.next_badge {
            Some(badge) => format!(
                "Next badge: {} {} ({} more level{})",
                badge.symbol(),
                badge.name,
                badge.requirement.saturating_sub(view.completed_count()),
                if badge.requirement.saturating_sub(view.completed_count()) == 1 { "" } else { "s" }
            ),
            None => "Every badge earned. You are a true Cyber Guardian!".to_string(),
        };
        frame.render_widget(
            Paragraph::new(next)
                .style(Style::default().fg(self.theme.fg))
                .wrap(Wrap { trim: true }),
            rows[4],
        );

        // Badges
        let items: Vec<ListItem> = view
            .badges
            .iter()
            .map(|badge| {
                let earned = view.user.has_badge(&badge.id);
                let color = if earned { hex_color(&badge.color, self.theme.success) } else { self.theme.locked };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!(" {} {}", badge.symbol(), badge.name),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("    {}", badge.description),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();
        frame.render_widget(List::new(items).block(styled_block("Badges", &self.theme)), columns[1]);

        self.render_status_bar(frame, layout[2], &view, "Enter play | t tips | ? help | q quit");
    }

    fn render_level_select(&mut self, frame: &mut Frame) {
        let view = self.game.view();
        let layout = create_main_layout(frame.area());
        self.render_header(
            frame,
            layout[0],
            "Select a Level",
            &format!("Score {}", view.user.total_score),
        );

        let items: Vec<ListItem> = view
            .levels
            .iter()
            .map(|level| {
                let (glyph, color) = if level.is_completed {
                    ("✔", hex_color(&level.color, self.theme.success))
                } else if level.is_unlocked {
                    ("▶", hex_color(&level.color, self.theme.accent))
                } else {
                    ("🔒", self.theme.locked)
                };
                let pips: String = (1..=5)
                    .map(|i| if i <= level.difficulty() { '★' } else { '☆' })
                    .collect();
                let mut detail = format!("      {}  {}", pips, level.description);
                if level.is_completed {
                    detail.push_str(&format!("  | Best: {}", level.best_score));
                }
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!(" {} Level {}: {}", glyph, level.id, level.title),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(styled_block("Campaign", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("→ ");
        frame.render_stateful_widget(list, layout[1], &mut self.menu_state);

        self.render_status_bar(frame, layout[2], &view, "Enter play | t tips | Esc dashboard");
    }

    fn render_level(&mut self, frame: &mut Frame) {
        let view = self.game.view();
        let Some(session) = view.session else {
            return;
        };
        let title = view
            .level(session.level_id())
            .map(|l| format!("Level {}: {}", l.id, l.title))
            .unwrap_or_default();

        let layout = create_main_layout(frame.area());
        self.render_header(frame, layout[0], &title, &format!("Score {}", session.score()));

        let mut menu_state = self.menu_state.clone();
        match session.phase() {
            SessionPhase::Intro => self.render_intro(frame, layout[1], &view, session),
            SessionPhase::Playing => {
                self.render_playing(frame, layout[1], &view, session, &mut menu_state)
            }
            SessionPhase::Completed => self.render_completed(frame, layout[1], &view, session),
            SessionPhase::Failed => self.render_failed(frame, layout[1], session),
        }

        let hints = match session.phase() {
            SessionPhase::Intro => "Enter next | s skip | Esc back",
            SessionPhase::Playing => "↑/↓ or 1-9 choose | Enter answer | Esc abandon",
            SessionPhase::Completed => "Enter continue | r retry",
            SessionPhase::Failed => "r retry | Esc level select",
        };
        self.render_status_bar(frame, layout[2], &view, hints);
        self.menu_state = menu_state;
    }

    fn render_intro(&self, frame: &mut Frame, area: Rect, view: &GameView, session: &Session) {
        let scene = view
            .level(session.level_id())
            .map(|l| l.scene.to_string())
            .unwrap_or_default();

        let mut lines = vec![
            Line::from(Span::styled(
                format!("📍 {}", scene),
                Style::default().fg(self.theme.header),
            )),
            Line::from(""),
        ];
        if session.is_leaving_intro() {
            lines.push(Line::from(Span::styled(
                "Heading in...",
                Style::default().fg(self.theme.accent).add_modifier(Modifier::ITALIC),
            )));
        } else if let Some(text) = session.current_dialogue() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(self.theme.fg),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("({}/{})", session.dialogue_index() + 1, session.dialogue_len()),
                Style::default().fg(self.theme.border),
            )));
        }

        let intro = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(styled_block("Briefing", &self.theme));
        frame.render_widget(intro, area);
    }

    fn render_playing(
        &self,
        frame: &mut Frame,
        area: Rect,
        view: &GameView,
        session: &Session,
        menu_state: &mut ListState,
    ) {
        let content = create_content_layout(area);
        self.render_character_panel(frame, content[0], view, session);

        let Some(scenario) = session.current_scenario() else {
            return;
        };
        let main = create_main_area_layout(content[1]);
        self.render_scenario(frame, main[0], session, scenario);

        match session.outcome() {
            Some(outcome) => {
                let (headline, color) = if outcome.correct {
                    (format!("✔ Correct! +{} points", outcome.points_awarded), self.theme.success)
                } else {
                    ("✘ Not quite. You lost a life.".to_string(), self.theme.alert)
                };
                let explanation = Paragraph::new(vec![
                    Line::from(Span::styled(headline, Style::default().fg(color).add_modifier(Modifier::BOLD))),
                    Line::from(""),
                    Line::from(outcome.explanation.clone()),
                ])
                .wrap(Wrap { trim: true })
                .block(styled_block("Explanation", &self.theme));
                frame.render_widget(explanation, main[1]);
            }
            None => {
                let items: Vec<ListItem> = scenario
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| ListItem::new(format!(" {}. {}", i + 1, option.text)))
                    .collect();
                let list = List::new(items)
                    .block(styled_block("What do you do?", &self.theme))
                    .highlight_style(
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    )
                    .highlight_symbol("→ ");
                frame.render_stateful_widget(list, main[1], menu_state);
            }
        }
    }

    fn render_character_panel(&self, frame: &mut Frame, area: Rect, view: &GameView, session: &Session) {
        let character = view.user.selected_character;
        let block = styled_block(character.name(), &self.theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(format!("{}  {}", character.symbol(), mood_face(session.mood())))
                .alignment(Alignment::Center),
            rows[0],
        );
        frame.render_widget(LivesIndicator::new(session.lives(), INITIAL_LIVES), rows[1]);
        frame.render_widget(
            ProgressBar::new(
                "Threat",
                session.scenario_index() as u32 + 1,
                session.scenario_count() as u32,
            )
            .color(self.theme.accent),
            rows[3],
        );

        if let Some(thought) = session.thought() {
            let bubble = Paragraph::new(format!("💭 {}", thought))
                .style(Style::default().fg(self.theme.warning).add_modifier(Modifier::ITALIC))
                .wrap(Wrap { trim: true });
            frame.render_widget(bubble, rows[4]);
        }
    }

    fn render_scenario(&self, frame: &mut Frame, area: Rect, session: &Session, scenario: &Scenario) {
        let block = styled_block(
            &format!("{} {}", scenario.kind.symbol(), scenario.kind.label()),
            &self.theme,
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        if session.threat_popup_visible() {
            frame.render_widget(ThreatAlert::new(scenario.kind), rows[0]);
        }

        let lines: Vec<Line> = scenario
            .content
            .lines()
            .into_iter()
            .map(|(label, value)| {
                if label.is_empty() {
                    Line::from(value.to_string())
                } else {
                    Line::from(vec![
                        Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(value.to_string()),
                    ])
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), rows[1]);
    }

    fn render_completed(&self, frame: &mut Frame, area: Rect, view: &GameView, session: &Session) {
        let mut lines = vec![
            format!("Score: {}", session.score()),
            format!(
                "Correct answers: {}/{} ({}%)",
                session.correct_answers(),
                session.scenario_count(),
                session.accuracy_percent()
            ),
        ];
        if session.is_perfect() {
            lines.push("★ Perfect run! ★".to_string());
        }
        lines.push(String::new());
        if let Some(level) = view.level(session.level_id()) {
            lines.extend(level.completion_dialogue.iter().cloned());
        }

        let popup = centered_rect(76, lines.len() as u16 + 2, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            DramaticBox::new("LEVEL COMPLETE").content(lines).border_color(self.theme.success),
            popup,
        );
    }

    fn render_failed(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let lines = vec![
            "You ran out of lives.".to_string(),
            format!("Score this attempt: {}", session.score()),
            format!("Correct answers: {}", session.correct_answers()),
            String::new(),
            "Every mistake here is one you won't make for real.".to_string(),
        ];
        let popup = centered_rect(60, lines.len() as u16 + 2, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            DramaticBox::new("MISSION FAILED").content(lines).border_color(self.theme.alert),
            popup,
        );
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, title: &str, right: &str) {
        let header_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(20),
                Constraint::Min(20),
                Constraint::Length(28),
            ])
            .split(area);

        let border = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border));

        let logo = Paragraph::new(SMALL_LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .block(border.clone());
        frame.render_widget(logo, header_layout[0]);

        let title = Paragraph::new(title.to_string())
            .style(Style::default().fg(self.theme.warning))
            .alignment(Alignment::Center)
            .block(border.clone());
        frame.render_widget(title, header_layout[1]);

        let right = Paragraph::new(format!(" {} ", right))
            .style(Style::default().fg(self.theme.fg))
            .alignment(Alignment::Right)
            .block(border);
        frame.render_widget(right, header_layout[2]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, view: &GameView, hints: &str) {
        let mut spans = Vec::new();
        if let Some(message) = view.last_message {
            spans.push(Span::styled(
                format!(" {} ", message.message),
                Style::default().fg(message_color(message.kind, &self.theme)),
            ));
            spans.push(Span::raw("|"));
        }
        spans.push(Span::raw(format!(" {} ", hints)));

        let status = Paragraph::new(Line::from(spans))
            .style(Style::default().fg(self.theme.fg).bg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(status, area);
    }

    fn render_tips_overlay(&self, frame: &mut Frame, view: &GameView) {
        let popup = centered_rect(72, 28, frame.area());
        frame.render_widget(Clear, popup);

        let mut lines = Vec::new();
        for category in view.tips {
            lines.push(Line::from(Span::styled(
                category.category.clone(),
                Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD),
            )));
            for tip in &category.tips {
                lines.push(Line::from(format!("  • {}", tip)));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Esc to close",
            Style::default().fg(self.theme.border),
        )));

        let tips = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(styled_block("Security Tips", &self.theme));
        frame.render_widget(tips, popup);
    }

    fn render_badge_overlay(&self, frame: &mut Frame, view: &GameView) {
        let Some(badge) = view.pending_badge else {
            return;
        };
        let popup = centered_rect(54, 8, frame.area());
        frame.render_widget(Clear, popup);

        let lines = vec![
            format!("{}  {}", badge.symbol(), badge.name),
            badge.description.clone(),
            String::new(),
            "Press Enter to continue".to_string(),
        ];
        frame.render_widget(
            DramaticBox::new("BADGE EARNED")
                .content(lines)
                .border_color(hex_color(&badge.color, self.theme.warning)),
            popup,
        );
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered_rect(70, 20, frame.area());
        frame.render_widget(Clear, popup_area);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.accent)));
        frame.render_widget(help, popup_area);
    }
}

fn option_id(view: &GameView, index: usize) -> Option<String> {
    view.session
        .and_then(Session::current_scenario)
        .and_then(|s| s.options.get(index))
        .map(|o| o.id.clone())
}

fn mood_face(mood: Mood) -> &'static str {
    match mood {
        Mood::Neutral => "😐",
        Mood::Thinking => "🤔",
        Mood::Happy => "😄",
        Mood::Concerned => "😟",
        Mood::Confident => "😎",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::data::Catalog;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;

    fn app() -> App {
        App::new(Game::with_seed(Arc::new(Catalog::standard()), GameConfig::default(), 3))
    }

    fn draw(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }

    fn correct_index(app: &App) -> usize {
        let scenario = app.game.session().unwrap().current_scenario().unwrap();
        scenario
            .options
            .iter()
            .position(|o| o.is_correct)
            .unwrap()
    }

    #[test]
    fn keys_drive_a_full_level() {
        let mut app = app();
        draw(&mut app);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.game.user().selected_character, CharacterType::Intern);
        assert_eq!(app.game.phase(), GamePhase::Dashboard);
        draw(&mut app);

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.game.phase(), GamePhase::LevelSelect);
        draw(&mut app);

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.game.phase(), GamePhase::InLevel(SessionPhase::Intro));
        draw(&mut app);

        app.handle_key(KeyCode::Char('s'));
        app.tick(Duration::from_millis(500));
        assert_eq!(app.game.phase(), GamePhase::InLevel(SessionPhase::Playing));

        while app.game.phase() == GamePhase::InLevel(SessionPhase::Playing) {
            draw(&mut app);
            let index = correct_index(&app);
            for _ in 0..index {
                app.handle_key(KeyCode::Down);
            }
            app.handle_key(KeyCode::Enter);
            draw(&mut app);
            app.tick(Duration::from_millis(3000));
        }

        assert_eq!(app.game.phase(), GamePhase::InLevel(SessionPhase::Completed));
        draw(&mut app);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.game.phase(), GamePhase::LevelSelect);
        assert_eq!(app.game.user().total_score, 400);
        // Selection follows the player to the newly unlocked level
        assert_eq!(app.menu_state.selected(), Some(1));
    }

    #[test]
    fn digit_keys_answer_directly() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('s'));
        app.tick(Duration::from_millis(500));

        let index = correct_index(&app);
        let digit = char::from_digit(index as u32 + 1, 10).unwrap();
        app.handle_key(KeyCode::Char(digit));
        assert!(app.game.session().unwrap().outcome().unwrap().correct);
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char('?'));
        assert!(app.show_help);
        draw(&mut app);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.game.phase(), GamePhase::CharacterSelect);
        app.handle_key(KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn tips_overlay_opens_and_closes() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('t'));
        assert!(app.game.view().show_tips);
        draw(&mut app);
        app.handle_key(KeyCode::Esc);
        assert!(!app.game.view().show_tips);
        assert_eq!(app.game.phase(), GamePhase::Dashboard);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut app = app();
        app.handle_key(KeyCode::Up);
        assert_eq!(app.menu_state.selected(), Some(0));
        for _ in 0..10 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.menu_state.selected(), Some(CharacterType::ALL.len() - 1));
    }

    #[test]
    fn quit_stops_the_app() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.running);
    }
}
