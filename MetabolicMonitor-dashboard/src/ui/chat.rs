use metabolic_monitor_domain::entities::{markup_segments, ChatMessage, ChatRole};
use metabolic_monitor_domain::services::ChatSession;
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use super::{colors, pane};

/// One terminal line per line of the message; markup applies within a line
fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let (prefix, color) = match message.role {
        ChatRole::User => ("You: ", colors::ACCENT),
        ChatRole::Assistant => ("Assistant: ", colors::NORMAL),
    };
    let text_style = Style::default().fg(colors::TEXT);

    message
        .content
        .split('\n')
        .enumerate()
        .map(|(index, text)| {
            let mut spans = Vec::new();
            if index == 0 {
                spans.push(Span::styled(prefix, Style::default().fg(color).bold()));
            }
            spans.extend(markup_segments(text).into_iter().map(|segment| {
                let style = if segment.bold { text_style.bold() } else { text_style };
                Span::styled(segment.text, style)
            }));
            Line::from(spans)
        })
        .collect()
}

pub(crate) fn draw(frame: &mut Frame, area: Rect, chat: &ChatSession, focused: bool) {
    let block = pane("Chat", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let mut lines: Vec<Line> = chat.transcript().iter().flat_map(message_lines).collect();
    if chat.is_responding() {
        lines.push(Line::from(Span::styled(
            "Assistant is typing...",
            Style::default().fg(colors::MUTED).italic(),
        )));
    }

    // Keep the newest messages in view
    let height = rows[0].height as usize;
    let width = rows[0].width.max(1) as usize;
    let wrapped: usize = lines.iter().map(|line| line.width().max(1).div_ceil(width)).sum();
    let scroll = wrapped.saturating_sub(height) as u16;

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0)),
        rows[0],
    );

    let prompt = if chat.is_responding() {
        Span::styled("  waiting for reply", Style::default().fg(colors::MUTED))
    } else {
        Span::styled(format!("> {}", chat.input()), Style::default().fg(colors::TEXT))
    };
    frame.render_widget(Paragraph::new(Line::from(prompt)), rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold_spans(line: &Line) -> Vec<String> {
        line.spans
            .iter()
            .filter(|span| span.style.add_modifier.contains(Modifier::BOLD))
            .map(|span| span.content.to_string())
            .collect()
    }

    #[test]
    fn test_bold_markup_becomes_bold_spans() {
        let lines = message_lines(&ChatMessage::assistant("Your **HbA1c** is fine"));
        assert_eq!(lines.len(), 1);
        assert_eq!(bold_spans(&lines[0]), vec!["Assistant: ".to_string(), "HbA1c".to_string()]);
    }

    #[test]
    fn test_newlines_start_new_lines() {
        let lines = message_lines(&ChatMessage::assistant("Summary:\n- **HbA1c** 5.9%\n\nKeep it up"));

        let text: Vec<String> = lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect();
        assert_eq!(text, vec!["Assistant: Summary:", "- HbA1c 5.9%", "", "Keep it up"]);
        assert_eq!(bold_spans(&lines[1]), vec!["HbA1c".to_string()]);
    }
}
