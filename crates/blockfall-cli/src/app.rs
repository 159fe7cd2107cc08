use std::time::{Duration, Instant};

use blockfall_engine::{Command, GameSession, KeyRepeat, RepeatKey};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::{
    tui::{App, Tui},
    widgets::SessionDisplay,
};

const TICK_RATE: f64 = 60.0;

/// How long a movement key may go silent before it counts as released.
///
/// Terminals without keyboard enhancement never report key releases; the
/// only sign a key is still held is the stream of auto-repeat press events.
/// The window must outlast the terminal's initial auto-repeat delay, or a
/// held key would be dropped before its first repeat arrives.
const HOLD_SILENCE: Duration = Duration::from_millis(500);

fn key_slot(key: RepeatKey) -> usize {
    match key {
        RepeatKey::Left => 0,
        RepeatKey::Right => 1,
        RepeatKey::Down => 2,
    }
}

fn repeat_key(code: KeyCode) -> Option<RepeatKey> {
    match code {
        KeyCode::Left => Some(RepeatKey::Left),
        KeyCode::Right => Some(RepeatKey::Right),
        KeyCode::Down => Some(RepeatKey::Down),
        _ => None,
    }
}

/// Interactive play session: owns the game state, tracks held movement keys,
/// and renders the composed session display.
#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    repeat: KeyRepeat,
    last_seen: [Option<Instant>; 3],
    started: Instant,
    show_ghost: bool,
    exiting: bool,
}

impl PlayApp {
    #[must_use]
    pub fn new(seed: Option<u64>, show_ghost: bool) -> Self {
        let session = match seed {
            Some(seed) => GameSession::with_seed(seed),
            None => GameSession::new(),
        };
        Self {
            session,
            repeat: KeyRepeat::new(),
            last_seen: [None; 3],
            started: Instant::now(),
            show_ghost,
            exiting: false,
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn on_key(&mut self, event: KeyEvent) {
        if event.kind == KeyEventKind::Release {
            if let Some(key) = repeat_key(event.code) {
                self.repeat.key_up(key);
                self.last_seen[key_slot(key)] = None;
            }
            return;
        }

        if let Some(key) = repeat_key(event.code) {
            self.last_seen[key_slot(key)] = Some(Instant::now());
            // The first press moves immediately and arms the repeat timer;
            // terminal auto-repeat presses for a key we already track are
            // ignored, the timer paces the movement instead.
            if !self.repeat.is_held(key) {
                self.repeat.key_down(key, self.now_ms());
                let _ = self.session.apply(key.command());
            }
            return;
        }

        // Repeat events only pace held movement; every other key acts once
        // per press.
        if event.kind == KeyEventKind::Repeat {
            return;
        }
        match event.code {
            KeyCode::Up | KeyCode::Char('x') => _ = self.session.apply(Command::RotateCw),
            KeyCode::Char('z') => _ = self.session.apply(Command::RotateCcw),
            KeyCode::Char(' ') => _ = self.session.apply(Command::HardDrop),
            KeyCode::Char('p') => _ = self.session.apply(Command::TogglePause),
            KeyCode::Char('r') => _ = self.session.apply(Command::Restart),
            KeyCode::Char('q') | KeyCode::Esc => self.exiting = true,
            _ => {}
        }
    }

    fn help_text(&self) -> &'static str {
        if self.session.phase().is_paused() {
            "P (Resume) | Q (Quit)"
        } else if self.session.phase().is_game_over() {
            "R (Restart) | Q (Quit)"
        } else {
            "← → (Move) | ↓ (Soft Drop) | Space (Hard Drop) | Z X (Rotate) | P (Pause) | Q (Quit)"
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(TICK_RATE);
    }

    fn should_exit(&self) -> bool {
        self.exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        if let Some(key) = event.as_key_event() {
            self.on_key(key);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let display = SessionDisplay::new(&self.session, self.show_ghost);
        let help = Text::from(self.help_text())
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(23), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(display, main_area);
        frame.render_widget(help, help_area);
    }

    fn update(&mut self, _tui: &mut Tui) {
        let now_ms = self.now_ms();

        for key in RepeatKey::ALL {
            if let Some(seen) = self.last_seen[key_slot(key)]
                && seen.elapsed() >= HOLD_SILENCE
            {
                self.repeat.key_up(key);
                self.last_seen[key_slot(key)] = None;
            }
        }
        for key in self.repeat.due(now_ms) {
            let _ = self.session.apply(key.command());
        }

        self.session.tick(now_ms);
    }
}
