use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;

use crate::error::Result;
use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_STYLE: Style = Style::new().fg(Color::Rgb(120, 170, 255));
pub const INCREASE_STYLE: Style = Style::new().fg(Color::Red);
pub const DECREASE_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));

pub const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);

pub fn money_span(amount: f64) -> Span<'static> {
    Span::styled(money(amount), AMOUNT_STYLE)
}

/// Spending going up is bad news, so increases render red.
pub fn change_span(pct: f64) -> Span<'static> {
    let style = if pct >= 0.0 {
        INCREASE_STYLE
    } else {
        DECREASE_STYLE
    };
    Span::styled(crate::fmt::signed_pct(pct), style)
}

pub enum ViewAction {
    Continue,
    Close,
    /// Re-read the store and rebuild the view's data.
    Reload,
}

pub trait View {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ViewAction;
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Run an interactive ratatui view. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_view(view: &mut dyn View) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match view.handle_key(key.code) {
                    ViewAction::Close => break Ok(()),
                    ViewAction::Reload => {
                        if let Err(e) = view.reload() {
                            break Err(e);
                        }
                    }
                    ViewAction::Continue => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}
