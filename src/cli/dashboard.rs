use chrono::{Duration, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::error::Result;
use crate::fmt::{bar, long_date, money};
use crate::reports::{self, DashboardSummary};
use crate::settings::load_settings;
use crate::store::ExpenseStore;
use crate::tui::{
    change_span, money_span, run_view, View, ViewAction, BOLD, FOOTER_STYLE, HEADER_STYLE,
};

const RECENT_COUNT: usize = 5;

pub struct Dashboard {
    store: ExpenseStore,
    greeting: String,
    window: u32,
    today: NaiveDate,
    /// Last day of the trend window; also picks the "current" month.
    anchor: NaiveDate,
    data: DashboardSummary,
}

impl Dashboard {
    pub fn new(store: ExpenseStore, user_name: &str, window: u32, today: NaiveDate) -> Self {
        let first_name = user_name.split_whitespace().next().unwrap_or("");
        let greeting = if first_name.is_empty() {
            "Penny: here's where your money went.".to_string()
        } else {
            format!("Hello, {first_name}. Here's where your money went.")
        };
        let data = reports::get_dashboard(store.expenses(), today, window);
        Self {
            store,
            greeting,
            window,
            today,
            anchor: today,
            data,
        }
    }

    fn refresh(&mut self) {
        self.data = reports::get_dashboard(self.store.expenses(), self.anchor, self.window);
    }

    fn shift(&mut self, days: i64) {
        let Some(next) = Duration::try_days(days).and_then(|d| self.anchor.checked_add_signed(d))
        else {
            return;
        };
        self.anchor = next.min(self.today);
        self.refresh();
    }

    fn stats_lines(&self) -> Vec<Line<'static>> {
        let d = &self.data;
        vec![
            Line::from(Span::styled(format!(" {}", d.current_month.label()), BOLD)),
            Line::from(vec![
                Span::raw(" This month     "),
                money_span(d.current_total),
            ]),
            Line::from(vec![
                Span::raw(" Last month     "),
                money_span(d.previous_total),
            ]),
            Line::from(vec![
                Span::raw(" vs last month  "),
                change_span(d.change_pct),
            ]),
            Line::from(format!(" Expenses       {}", d.expense_count)),
        ]
    }

    fn category_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            " Spending by Category (This Month)",
            BOLD,
        ))];
        if self.data.categories.is_empty() {
            lines.push(Line::from(Span::styled(" No expenses this month", FOOTER_STYLE)));
        }
        let bar_width = width.saturating_sub(36).clamp(4, 30);
        for c in &self.data.categories {
            lines.push(Line::from(vec![
                Span::raw(format!(
                    " {} {:<14}",
                    c.total.category.icon(),
                    c.total.category.name()
                )),
                money_span(c.total.total),
                Span::raw(" "),
                Span::styled(bar(c.pct, bar_width), Style::default().fg(Color::Blue)),
                Span::styled(format!(" {:.1}%", c.pct), FOOTER_STYLE),
            ]));
        }
        lines
    }

    fn recent_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(" Recent Expenses", BOLD))];
        for e in self.store.recent(RECENT_COUNT) {
            lines.push(Line::from(vec![
                Span::raw(format!(
                    " {} {:<24} {:<12} ",
                    e.category.icon(),
                    truncate(e.title(), 24),
                    long_date(e.date)
                )),
                money_span(e.amount),
            ]));
        }
        lines
    }

    fn draw_week(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let bars: Vec<Bar> = self
            .data
            .week
            .iter()
            .map(|day| {
                Bar::default()
                    .value((day.total * 100.0).round() as u64)
                    .text_value(money(day.total))
                    .label(Line::from(day.label.clone()))
                    .style(Style::default().fg(Color::Cyan))
            })
            .collect();
        let block = Block::default()
            .title(format!(
                "Spending Trend (to {})",
                long_date(self.anchor)
            ))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::NONE);
        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(9)
            .bar_gap(1);
        frame.render_widget(chart, area);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep1, top_area, sep2, chart_area, sep3, recent_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(9),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(RECENT_COUNT as u16 + 1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}", self.greeting)).style(HEADER_STYLE),
            header_area,
        );
        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget.clone(), sep2);
        frame.render_widget(sep_widget, sep3);

        if self.store.is_empty() {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(Span::styled(" No expenses yet", BOLD)),
                    Line::from(" Add your first expense with `penny add <amount>`."),
                ]),
                top_area,
            );
        } else {
            let [left, right] = Layout::horizontal([
                Constraint::Percentage(35),
                Constraint::Percentage(65),
            ])
            .areas(top_area);
            frame.render_widget(Paragraph::new(self.stats_lines()), left);
            frame.render_widget(
                Paragraph::new(self.category_lines(right.width as usize)),
                right,
            );
            self.draw_week(frame, chart_area);
            frame.render_widget(Paragraph::new(self.recent_lines()), recent_area);
        }

        frame.render_widget(
            Paragraph::new(" \u{2190}/\u{2192} week  t today  r reload  q quit")
                .style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ViewAction::Close,
            KeyCode::Char('r') => ViewAction::Reload,
            KeyCode::Left => {
                self.shift(-i64::from(self.window));
                ViewAction::Continue
            }
            KeyCode::Right => {
                self.shift(i64::from(self.window));
                ViewAction::Continue
            }
            KeyCode::Char('t') => {
                self.anchor = self.today;
                self.refresh();
                ViewAction::Continue
            }
            _ => ViewAction::Continue,
        }
    }

    fn reload(&mut self) -> Result<()> {
        self.store = super::open_store()?;
        self.today = chrono::Local::now().date_naive();
        self.anchor = self.anchor.min(self.today);
        self.refresh();
        Ok(())
    }
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let store = super::open_store()?;
    let today = chrono::Local::now().date_naive();
    let mut dashboard = Dashboard::new(store, &settings.user_name, settings.week_window, today);
    run_view(&mut dashboard)
}
