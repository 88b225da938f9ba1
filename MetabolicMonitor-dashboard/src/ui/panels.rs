use metabolic_monitor_domain::services::panels::{
    explanations_panel, suggestions_panel, PanelView, DEFINITION_TEXT, DEFINITION_TITLE,
};
use metabolic_monitor_domain::services::DashboardState;
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use super::{colors, pane};

pub(crate) fn draw_definition(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(DEFINITION_TEXT)
        .style(Style::default().fg(colors::TEXT))
        .wrap(Wrap { trim: true })
        .block(pane(DEFINITION_TITLE, false));
    frame.render_widget(paragraph, area);
}

pub(crate) fn draw_insights(frame: &mut Frame, area: Rect, dashboard: &DashboardState) {
    if dashboard.is_loading() {
        let loading = Paragraph::new("Generating insights...")
            .style(Style::default().fg(colors::MUTED))
            .alignment(Alignment::Center)
            .block(pane("Insights", false));
        frame.render_widget(loading, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let insights = dashboard.insights();
    draw_panel(frame, columns[0], &explanations_panel(insights));
    draw_panel(frame, columns[1], &suggestions_panel(insights));
}

fn draw_panel(frame: &mut Frame, area: Rect, panel: &PanelView<'_>) {
    let lines: Vec<Line> = match panel.placeholder {
        Some(placeholder) => vec![Line::from(Span::styled(
            placeholder,
            Style::default().fg(colors::MUTED),
        ))],
        None => panel
            .entries
            .iter()
            .flat_map(|entry| {
                [
                    Line::from(Span::styled(
                        entry.label.clone(),
                        Style::default().fg(colors::ACCENT).bold(),
                    )),
                    Line::from(Span::styled(entry.text.clone(), Style::default().fg(colors::TEXT))),
                    Line::from(""),
                ]
            })
            .collect(),
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(pane(panel.title, false));
    frame.render_widget(paragraph, area);
}
