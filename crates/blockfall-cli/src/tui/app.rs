use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// Trait for applications driven by [`Tui::run`].
pub trait App {
    /// Called once before the event loop starts. Use this to set the tick
    /// rate.
    fn init(&mut self, tui: &mut Tui);

    /// Returns whether the event loop should stop.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    /// Draws the screen. Called whenever state may have changed.
    fn draw(&self, frame: &mut Frame);

    /// Advances application logic. Called once per tick.
    fn update(&mut self, tui: &mut Tui);
}
