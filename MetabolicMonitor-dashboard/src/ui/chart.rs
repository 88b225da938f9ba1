use metabolic_monitor_domain::entities::{ChartPoint, HealthStatus};
use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph},
};

use super::{colors, pane};
use crate::app::{App, Focus};

/// Columns the y-axis labels take left of the plot
const Y_AXIS_WIDTH: u16 = 6;

/// Rows the x-axis line and labels take below the plot
const X_AXIS_HEIGHT: u16 = 2;

/// Boundaries between the status bands
const BAND_THRESHOLDS: [f64; 2] = [5.7, 6.5];

pub(crate) fn status_color(status: HealthStatus) -> Color {
    match status {
        HealthStatus::NoData => colors::NO_DATA,
        HealthStatus::Normal => colors::NORMAL,
        HealthStatus::Elevated => colors::ELEVATED,
        HealthStatus::High => colors::HIGH,
    }
}

/// Where points are plotted inside a chart pane of size `area`
///
/// Skips the border, the status line, and the axes; mouse columns inside
/// this rectangle map linearly onto the visible dates.
pub fn plot_area(area: Rect) -> Rect {
    let inner_x = area.x.saturating_add(1);
    let inner_y = area.y.saturating_add(2);
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(3);

    Rect {
        x: inner_x.saturating_add(Y_AXIS_WIDTH),
        y: inner_y,
        width: inner_width.saturating_sub(Y_AXIS_WIDTH),
        height: inner_height.saturating_sub(X_AXIS_HEIGHT),
    }
}

pub(crate) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = pane("HbA1c Over Time", app.focus() == Focus::Chart);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(inner);

    frame.render_widget(Paragraph::new(status_line(app)), rows[0]);

    let chart = app.chart();
    let visible = chart.visible_points();
    let (Some((bottom, top)), Some(first)) = (chart.value_bounds(), visible.first()) else {
        let empty = Paragraph::new("No HbA1c readings yet")
            .style(Style::default().fg(colors::MUTED))
            .alignment(Alignment::Center);
        frame.render_widget(empty, rows[1]);
        return;
    };

    let x_of = |point: &ChartPoint| (point.date - first.date).num_days() as f64;
    let span = visible.last().map(|p| x_of(p)).unwrap_or(0.0).max(1.0);

    let line: Vec<(f64, f64)> = visible.iter().map(|p| (x_of(p), p.value)).collect();
    let band = |status: HealthStatus| -> Vec<(f64, f64)> {
        visible
            .iter()
            .filter(|p| p.status() == status)
            .map(|p| (x_of(p), p.value))
            .collect()
    };
    let bands = [
        (HealthStatus::Normal, band(HealthStatus::Normal)),
        (HealthStatus::Elevated, band(HealthStatus::Elevated)),
        (HealthStatus::High, band(HealthStatus::High)),
    ];
    let thresholds: Vec<[(f64, f64); 2]> = BAND_THRESHOLDS
        .iter()
        .filter(|t| **t > bottom && **t < top)
        .map(|t| [(0.0, *t), (span, *t)])
        .collect();
    let cursor: Vec<(f64, f64)> = app
        .chart_cursor()
        .and_then(|index| chart.points().get(index))
        .filter(|p| p.date >= first.date && visible.last().is_some_and(|last| p.date <= last.date))
        .map(|p| vec![(x_of(p), p.value)])
        .unwrap_or_default();

    let mut datasets: Vec<Dataset> = thresholds
        .iter()
        .map(|points| {
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors::NO_DATA))
                .data(points)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors::ACCENT))
            .data(&line),
    );
    for (status, points) in &bands {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(status_color(*status)))
                .data(points),
        );
    }
    if app.focus() == Focus::Chart {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(colors::TEXT))
                .data(&cursor),
        );
    }

    let last_label = visible.last().map(|p| p.label.clone()).unwrap_or_default();
    let x_axis = Axis::default()
        .style(Style::default().fg(colors::MUTED))
        .bounds([0.0, span])
        .labels(vec![Span::raw(first.label.clone()), Span::raw(last_label)]);
    let y_axis = Axis::default()
        .style(Style::default().fg(colors::MUTED))
        .bounds([bottom, top])
        .labels(vec![
            Span::raw(format!("{:.1}", bottom)),
            Span::raw(format!("{:.1}", (bottom + top) / 2.0)),
            Span::raw(format!("{:.1}", top)),
        ]);

    frame.render_widget(Chart::new(datasets).x_axis(x_axis).y_axis(y_axis), rows[1]);
}

fn status_line(app: &App) -> Line<'static> {
    let chart = app.chart();
    let status = chart.status();
    let mut spans = vec![
        Span::styled("Status ", Style::default().fg(colors::MUTED)),
        Span::styled(
            format!(" {} ", status.label()),
            Style::default().fg(Color::Black).bg(status_color(status)).bold(),
        ),
        Span::styled(format!(" {}", status.description()), Style::default().fg(colors::MUTED)),
    ];

    let selection = chart.selection();
    if let Some(left) = selection.left {
        let right = selection
            .right
            .map(|d| d.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| "...".to_string());
        spans.push(Span::styled(
            format!("  selecting {} to {}", left.format("%b %-d, %Y"), right),
            Style::default().fg(colors::ACCENT),
        ));
    } else if !chart.window().is_full_range() {
        spans.push(Span::styled("  [zoomed]", Style::default().fg(colors::ACCENT)));
    }
    if chart.is_loading() {
        spans.push(Span::styled("  loading...", Style::default().fg(colors::MUTED)));
    }
    if let Some(error) = chart.last_error() {
        spans.push(Span::styled(
            format!("  {}", error),
            Style::default().fg(colors::ERROR),
        ));
    }
    Line::from(spans)
}
