use ratatui::{prelude::*, widgets::Paragraph};

use super::{colors, pane};
use crate::app::{App, Focus, FormField};

pub(crate) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus() == Focus::Form;
    let form = app.form();
    let title = if form.is_submitting() { "Add Reading (saving...)" } else { "Add Reading" };
    let block = pane(title, focused);

    let mut lines: Vec<Line> = FormField::all()
        .map(|field| {
            let (label, text, unit) = match field {
                FormField::Date => ("Date", form.date().to_string(), ""),
                FormField::Value(biomarker) => (
                    biomarker.label(),
                    form.text(biomarker).to_string(),
                    biomarker.unit(),
                ),
            };
            let selected = focused && app.selected_field() == field;
            let marker = if selected { "> " } else { "  " };
            let value_style = if selected {
                Style::default().fg(colors::TEXT).bg(colors::ACCENT)
            } else {
                Style::default().fg(colors::TEXT)
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(colors::ACCENT)),
                Span::styled(format!("{:<18}", label), Style::default().fg(colors::MUTED)),
                Span::styled(format!("{:<10}", text), value_style),
                Span::styled(format!(" {}", unit), Style::default().fg(colors::MUTED)),
            ])
        })
        .collect();

    let ratio = form
        .ratio()
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| "-".to_string());
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<18}", "TG/HDL Ratio"), Style::default().fg(colors::MUTED)),
        Span::styled(ratio, Style::default().fg(colors::ACCENT).bold()),
    ]));
    lines.push(Line::from(Span::styled(
        format!("  submit mode: {}", app.policy()),
        Style::default().fg(colors::MUTED),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
