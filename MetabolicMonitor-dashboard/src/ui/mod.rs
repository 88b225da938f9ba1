//! Terminal rendering
//!
//! Pure functions of [`App`] state; the only thing drawing feeds back is the
//! chart's plot area, used to map mouse columns to dates.

mod chart;
mod chat;
mod form;
mod panels;

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::app::{App, Focus};

pub use chart::plot_area;

// Colour palette
pub(crate) mod colors {
    use ratatui::style::Color;

    pub const ACCENT: Color = Color::Rgb(136, 132, 216);
    pub const MUTED: Color = Color::Rgb(136, 136, 136);
    pub const TEXT: Color = Color::Rgb(235, 235, 235);
    pub const NORMAL: Color = Color::Rgb(34, 197, 94);
    pub const ELEVATED: Color = Color::Rgb(234, 179, 8);
    pub const HIGH: Color = Color::Rgb(239, 68, 68);
    pub const NO_DATA: Color = Color::Rgb(107, 114, 128);
    pub const ERROR: Color = Color::Rgb(239, 68, 68);
}

/// Bordered block, highlighted when its pane has focus
pub(crate) fn pane(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { colors::ACCENT } else { colors::MUTED };
    Block::default()
        .title(Span::styled(format!(" {} ", title), Style::default().fg(colors::TEXT).bold()))
        .borders(Borders::ALL)
        .border_type(if focused { BorderType::Thick } else { BorderType::Rounded })
        .border_style(Style::default().fg(border))
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(2), // Footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(4)])
        .split(columns[0]);
    form::draw(frame, left[0], app);
    panels::draw_definition(frame, left[1]);

    draw_right_column(frame, columns[1], app);
    draw_footer(frame, chunks[2], app);
}

#[derive(Clone, Copy)]
enum Section {
    Chart,
    Insights,
    Chat,
}

fn draw_right_column(frame: &mut Frame, area: Rect, app: &mut App) {
    let dashboard = app.dashboard();
    let sections: Vec<Section> = [
        (dashboard.shows_chart(), Section::Chart),
        (dashboard.shows_panels() || dashboard.is_loading(), Section::Insights),
        (dashboard.shows_chat(), Section::Chat),
    ]
    .into_iter()
    .filter_map(|(shown, section)| shown.then_some(section))
    .collect();

    let constraints = sections.iter().map(|section| match section {
        Section::Chart => Constraint::Percentage(40),
        Section::Insights => Constraint::Min(6),
        Section::Chat => Constraint::Percentage(35),
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    app.set_chart_area(Rect::default());
    for (section, row) in sections.into_iter().zip(rows.iter().copied()) {
        match section {
            Section::Chart => {
                chart::draw(frame, row, app);
                app.set_chart_area(plot_area(row));
            }
            Section::Insights => panels::draw_insights(frame, row, app.dashboard()),
            Section::Chat => chat::draw(frame, row, app.chat(), app.focus() == Focus::Chat),
        }
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mode = if app.is_demo() {
        Span::styled("[DEMO]", Style::default().fg(colors::ELEVATED).bold())
    } else {
        Span::styled("[LIVE]", Style::default().fg(colors::NORMAL).bold())
    };

    let mut spans = vec![
        Span::styled(" Metabolic Health Monitor ", Style::default().fg(colors::TEXT).bold()),
        Span::raw(" "),
        mode,
    ];
    if let Some(update) = app.last_update() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("updated {}", update.received_at.format("%H:%M:%S")),
            Style::default().fg(colors::MUTED),
        ));
    }
    if let Some(message) = app.dashboard().message() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message.to_string(), Style::default().fg(colors::ERROR).bold()));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors::ACCENT)),
    );
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints = match app.focus() {
        Focus::Form => "↑/↓ field  Enter save  Esc reset form",
        Focus::Chart => "←/→ move  Space/Enter select  Esc cancel  r reset zoom",
        Focus::Chat => "Enter send  Ctrl+L clear chat  F5 reload history",
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(hints, Style::default().fg(colors::MUTED)),
        Span::styled(
            "  Tab focus  Ctrl+X clear session  Ctrl+Q quit",
            Style::default().fg(colors::MUTED),
        ),
    ])];
    if let Some(notice) = app.notice() {
        let color = if notice.is_error { colors::ERROR } else { colors::NORMAL };
        lines.push(Line::from(Span::styled(notice.text.clone(), Style::default().fg(color))));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabolic_monitor_domain::services::SubmitPolicy;
    use ratatui::backend::TestBackend;

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 48)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_initial_screen() {
        let mut app = App::new(SubmitPolicy::AwaitPersistence, true);
        let screen = rendered(&mut app);

        assert!(screen.contains("Metabolic Health Monitor"));
        assert!(screen.contains("[DEMO]"));
        assert!(screen.contains("What is HbA1c"));
        assert!(screen.contains("NO DATA"));
    }
}
