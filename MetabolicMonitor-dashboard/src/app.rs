//! Dashboard composition
//!
//! [`App`] owns every state owner and is driven by a single event loop.
//! Terminal input, backend results, and live-update notifications all arrive
//! as [`AppEvent`]s; handling one never performs I/O itself but returns the
//! [`Effect`]s the runtime should start.

use chrono::{Local, NaiveDate};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use metabolic_monitor_data::models::Acknowledgement;
use metabolic_monitor_data::ApiError;
use metabolic_monitor_domain::entities::{Biomarker, ChartPoint, ChatMessage, Reading};
use metabolic_monitor_domain::events::ReadingsChanged;
use metabolic_monitor_domain::services::{
    ChartState, ChatSession, DashboardState, InsightOutcome, ReadingForm, RefreshToken,
    SubmitPolicy,
};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

/// Input delivered to the event loop
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    ReadingsChanged(ReadingsChanged),
    SeriesLoaded(RefreshToken, Result<Vec<ChartPoint>, ApiError>),
    InsightsLoaded(RefreshToken, InsightOutcome),
    TranscriptLoaded(RefreshToken, Result<Vec<ChatMessage>, ApiError>),
    ReadingSaved {
        date: String,
        policy: SubmitPolicy,
        result: Result<Acknowledgement, ApiError>,
    },
    ChatReplied(Result<String, ApiError>),
    ChatCleared(Result<(), ApiError>),
    SessionCleared(Result<(), ApiError>),
}

/// Backend work requested by the app
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadSeries(RefreshToken),
    FetchInsights(RefreshToken),
    /// Start or resume the conversation
    LoadTranscript(RefreshToken),
    /// Reload the stored conversation only
    LoadHistory(RefreshToken),
    SubmitReading {
        reading: Reading,
        policy: SubmitPolicy,
    },
    SendChat(String),
    ClearChat,
    ClearSession,
}

/// Pane receiving keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    Chart,
    Chat,
}

/// Form row under the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Value(Biomarker),
}

impl FormField {
    /// Rows in display order
    pub fn all() -> impl Iterator<Item = FormField> {
        std::iter::once(FormField::Date).chain(Biomarker::ALL.into_iter().map(FormField::Value))
    }

    fn index(self) -> usize {
        match self {
            FormField::Date => 0,
            FormField::Value(biomarker) => {
                1 + Biomarker::ALL
                    .iter()
                    .position(|b| *b == biomarker)
                    .unwrap_or_default()
            }
        }
    }

    fn at(index: usize) -> FormField {
        match index {
            0 => FormField::Date,
            i => FormField::Value(Biomarker::ALL[(i - 1).min(Biomarker::ALL.len() - 1)]),
        }
    }

    fn next(self) -> FormField {
        FormField::at((self.index() + 1) % (Biomarker::ALL.len() + 1))
    }

    fn previous(self) -> FormField {
        let count = Biomarker::ALL.len() + 1;
        FormField::at((self.index() + count - 1) % count)
    }
}

/// One-line status shown in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Root state of the dashboard
pub struct App {
    chart: ChartState,
    chat: ChatSession,
    dashboard: DashboardState,
    form: ReadingForm,
    policy: SubmitPolicy,
    focus: Focus,
    field: FormField,
    chart_cursor: usize,
    chart_area: Rect,
    notice: Option<Notice>,
    last_update: Option<ReadingsChanged>,
    demo: bool,
    running: bool,
    clock: fn() -> NaiveDate,
}

impl App {
    pub fn new(policy: SubmitPolicy, demo: bool) -> Self {
        Self::with_clock(policy, demo, local_today)
    }

    /// Create an app that takes "today" from `clock`
    pub fn with_clock(policy: SubmitPolicy, demo: bool, clock: fn() -> NaiveDate) -> Self {
        Self {
            chart: ChartState::new(),
            chat: ChatSession::new(),
            dashboard: DashboardState::new(),
            form: ReadingForm::new(clock()),
            policy,
            focus: Focus::Form,
            field: FormField::Date,
            chart_cursor: 0,
            chart_area: Rect::default(),
            notice: None,
            last_update: None,
            demo,
            running: true,
            clock,
        }
    }

    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn dashboard(&self) -> &DashboardState {
        &self.dashboard
    }

    pub fn form(&self) -> &ReadingForm {
        &self.form
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected_field(&self) -> FormField {
        self.field
    }

    /// Index of the highlighted point in the full series
    pub fn chart_cursor(&self) -> Option<usize> {
        (!self.chart.points().is_empty()).then_some(self.chart_cursor)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn last_update(&self) -> Option<&ReadingsChanged> {
        self.last_update.as_ref()
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Plot area of the chart as last drawn, used to map mouse columns to dates
    pub fn set_chart_area(&mut self, area: Rect) {
        self.chart_area = area;
    }

    /// Initial loads when the dashboard starts
    pub fn mount(&mut self) -> Vec<Effect> {
        let mut effects = vec![
            Effect::LoadSeries(self.chart.begin_refresh()),
            Effect::LoadTranscript(self.chat.begin_resync()),
        ];
        if self.dashboard.should_auto_fetch() {
            effects.push(Effect::FetchInsights(self.dashboard.begin_insight_fetch()));
        }
        effects
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key)
                } else {
                    Vec::new()
                }
            }
            AppEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Vec::new()
            }
            AppEvent::Resize => Vec::new(),
            AppEvent::ReadingsChanged(notification) => {
                info!(sequence = notification.sequence, "Refreshing after live update");
                self.last_update = Some(notification);
                self.refresh_after_change()
            }
            AppEvent::SeriesLoaded(token, result) => {
                if self.chart.apply_refresh(token, result) {
                    self.clamp_cursor();
                }
                Vec::new()
            }
            AppEvent::InsightsLoaded(token, outcome) => {
                self.dashboard.apply_insights(token, outcome);
                if self.focus == Focus::Chat && !self.dashboard.shows_chat() {
                    self.focus = Focus::Form;
                }
                Vec::new()
            }
            AppEvent::TranscriptLoaded(token, result) => {
                self.chat.apply_resync(token, result);
                Vec::new()
            }
            AppEvent::ReadingSaved {
                date,
                policy,
                result,
            } => self.reading_saved(date, policy, result),
            AppEvent::ChatReplied(result) => {
                self.chat.complete_send(result);
                Vec::new()
            }
            AppEvent::ChatCleared(result) => {
                self.chat.complete_clear(result);
                Vec::new()
            }
            AppEvent::SessionCleared(result) => {
                self.notice = Some(match result {
                    Ok(()) => Notice::info("Session cleared"),
                    Err(e) => {
                        warn!(error = %e, "Failed to clear readings");
                        Notice::error(format!("Failed to clear readings: {}", e))
                    }
                });
                Vec::new()
            }
        }
    }

    fn refresh_after_change(&mut self) -> Vec<Effect> {
        self.dashboard.on_readings_changed();
        vec![
            Effect::LoadSeries(self.chart.begin_refresh()),
            Effect::LoadTranscript(self.chat.begin_resync()),
            Effect::FetchInsights(self.dashboard.begin_insight_fetch()),
        ]
    }

    fn reading_saved(
        &mut self,
        date: String,
        policy: SubmitPolicy,
        result: Result<Acknowledgement, ApiError>,
    ) -> Vec<Effect> {
        let today = (self.clock)();
        if policy == SubmitPolicy::AwaitPersistence {
            self.form.finish_submit(result.is_ok(), today);
        }

        match result {
            Ok(_) => {
                self.notice = Some(Notice::info(format!("Reading for {} saved", date)));
                let was_cleared = self.dashboard.is_cleared();
                self.dashboard.on_reading_added();
                if was_cleared {
                    vec![
                        Effect::LoadSeries(self.chart.begin_refresh()),
                        Effect::FetchInsights(self.dashboard.begin_insight_fetch()),
                    ]
                } else {
                    Vec::new()
                }
            }
            Err(e) => {
                warn!(date = %date, error = %e, "Failed to save reading");
                self.notice = Some(Notice::error(format!("Failed to save reading: {}", e)));
                Vec::new()
            }
        }
    }

    fn visible_panes(&self) -> Vec<Focus> {
        let mut panes = vec![Focus::Form];
        if self.dashboard.shows_chart() {
            panes.push(Focus::Chart);
        }
        if self.dashboard.shows_chat() {
            panes.push(Focus::Chat);
        }
        panes
    }

    fn cycle_focus(&mut self, forward: bool) {
        let panes = self.visible_panes();
        let current = panes.iter().position(|p| *p == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % panes.len()
        } else {
            (current + panes.len() - 1) % panes.len()
        };
        self.focus = panes[next];
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.running = false;
                    return Vec::new();
                }
                KeyCode::Char('x') => return self.clear_session(),
                _ => {}
            }
        }

        match key.code {
            KeyCode::Tab => {
                self.cycle_focus(true);
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                return Vec::new();
            }
            _ => {}
        }

        match self.focus {
            Focus::Form => self.handle_form_key(key),
            Focus::Chart => {
                self.handle_chart_key(key);
                Vec::new()
            }
            Focus::Chat => self.handle_chat_key(key),
        }
    }

    fn clear_session(&mut self) -> Vec<Effect> {
        self.dashboard.clear_session();
        self.chart.reset_zoom();
        self.focus = Focus::Form;
        vec![Effect::ClearSession]
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        // Inputs stay locked until a pending save is acknowledged
        if self.form.is_submitting()
            && matches!(key.code, KeyCode::Esc | KeyCode::Backspace | KeyCode::Char(_))
        {
            return Vec::new();
        }

        match key.code {
            KeyCode::Up => self.field = self.field.previous(),
            KeyCode::Down => self.field = self.field.next(),
            KeyCode::Esc => self.form.reset((self.clock)()),
            KeyCode::Enter => return self.submit_form(),
            KeyCode::Backspace => {
                let mut text = self.field_text().to_string();
                text.pop();
                self.set_field_text(text);
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                let mut text = self.field_text().to_string();
                text.push(c);
                self.set_field_text(text);
            }
            _ => {}
        }
        Vec::new()
    }

    fn field_text(&self) -> &str {
        match self.field {
            FormField::Date => self.form.date(),
            FormField::Value(biomarker) => self.form.text(biomarker),
        }
    }

    fn set_field_text(&mut self, text: String) {
        match self.field {
            FormField::Date => self.form.set_date(text),
            FormField::Value(biomarker) => self.form.set_text(biomarker, text),
        }
    }

    fn submit_form(&mut self) -> Vec<Effect> {
        match self.form.begin_submit(self.policy, (self.clock)()) {
            Ok(reading) => {
                debug!(date = %reading.date, policy = %self.policy, "Submitting reading");
                self.notice = Some(Notice::info(format!("Saving reading for {}...", reading.date)));
                vec![Effect::SubmitReading {
                    reading,
                    policy: self.policy,
                }]
            }
            Err(e) => {
                self.notice = Some(Notice::error(e.to_string()));
                Vec::new()
            }
        }
    }

    fn handle_chart_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.chart.selection().is_active() {
                    self.chart.pointer_up();
                    self.clamp_cursor();
                } else {
                    let date = self.chart.date_at(self.chart_cursor);
                    self.chart.pointer_down(date);
                }
            }
            KeyCode::Esc => self.chart.cancel_selection(),
            KeyCode::Char('r') => self.chart.reset_zoom(),
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let Some(range) = self.chart.visible_range() else {
            return;
        };
        let current = self.chart_cursor.clamp(*range.start(), *range.end());
        let next = current.saturating_add_signed(delta).clamp(*range.start(), *range.end());
        self.chart_cursor = next;
        if self.chart.selection().is_active() {
            self.chart.pointer_move(self.chart.date_at(next));
        }
    }

    fn clamp_cursor(&mut self) {
        if let Some(range) = self.chart.visible_range() {
            self.chart_cursor = self.chart_cursor.clamp(*range.start(), *range.end());
        } else {
            self.chart_cursor = 0;
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('l') && self.chat.begin_clear() {
                return vec![Effect::ClearChat];
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Enter => {
                if let Some(message) = self.chat.begin_send() {
                    return vec![Effect::SendChat(message)];
                }
            }
            KeyCode::F(5) => return vec![Effect::LoadHistory(self.chat.begin_resync())],
            KeyCode::Backspace => self.chat.pop_input(),
            KeyCode::Char(c) => self.chat.push_input(c),
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.dashboard.shows_chart() {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.in_chart_area(mouse.column, mouse.row) {
                    return;
                }
                self.focus = Focus::Chart;
                let date = self.date_at_column(mouse.column);
                self.chart.pointer_down(date);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let date = self.date_at_column(mouse.column);
                self.chart.pointer_move(date);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.chart.selection().is_active() {
                    self.chart.pointer_up();
                    self.clamp_cursor();
                }
            }
            _ => {}
        }
    }

    fn in_chart_area(&self, column: u16, row: u16) -> bool {
        let area = self.chart_area;
        column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height)
    }

    /// Date of the visible point nearest to a terminal column
    pub fn date_at_column(&self, column: u16) -> Option<NaiveDate> {
        let area = self.chart_area;
        if area.width == 0 || column < area.x || column >= area.x.saturating_add(area.width) {
            return None;
        }
        let visible = self.chart.visible_points();
        let first = visible.first()?.date;
        let last = visible.last()?.date;

        let span = (last - first).num_days() as f64;
        let fraction = f64::from(column - area.x) / f64::from(area.width.saturating_sub(1).max(1));
        let target = fraction * span;

        visible
            .iter()
            .min_by(|a, b| {
                let da = ((a.date - first).num_days() as f64 - target).abs();
                let db = ((b.date - first).num_days() as f64 - target).abs();
                da.total_cmp(&db)
            })
            .map(|point| point.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabolic_monitor_domain::services::{NO_DATA_MESSAGE, CHAT_APOLOGY};
    use metabolic_monitor_domain::testing::{sample_insights, series, unavailable};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn app(policy: SubmitPolicy) -> App {
        App::with_clock(policy, false, today)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(key(KeyCode::Char(c)));
        }
    }

    fn token_of(effects: &[Effect], pick: fn(&Effect) -> Option<RefreshToken>) -> RefreshToken {
        effects.iter().find_map(pick).expect("effect not requested")
    }

    fn insights_token(effect: &Effect) -> Option<RefreshToken> {
        match effect {
            Effect::FetchInsights(token) => Some(*token),
            _ => None,
        }
    }

    fn series_token(effect: &Effect) -> Option<RefreshToken> {
        match effect {
            Effect::LoadSeries(token) => Some(*token),
            _ => None,
        }
    }

    /// App after mount with insights loaded and three chart points
    fn loaded_app() -> App {
        let mut app = app(SubmitPolicy::AwaitPersistence);
        let effects = app.mount();
        app.handle(AppEvent::InsightsLoaded(
            token_of(&effects, insights_token),
            InsightOutcome::Loaded(sample_insights()),
        ));
        app.handle(AppEvent::SeriesLoaded(
            token_of(&effects, series_token),
            Ok(series(&[(2024, 1, 1, 5.2), (2024, 2, 1, 5.8), (2024, 3, 1, 6.7)])),
        ));
        app
    }

    #[test]
    fn test_mount_requests_all_loads() {
        let mut app = app(SubmitPolicy::AwaitPersistence);
        let effects = app.mount();

        assert_eq!(effects.len(), 3);
        assert!(effects.iter().any(|e| matches!(e, Effect::LoadSeries(_))));
        assert!(effects.iter().any(|e| matches!(e, Effect::LoadTranscript(_))));
        assert!(effects.iter().any(|e| matches!(e, Effect::FetchInsights(_))));
    }

    #[test]
    fn test_form_typing_and_submit() {
        let mut app = app(SubmitPolicy::FireAndForget);
        app.handle(key(KeyCode::Down));
        app.handle(key(KeyCode::Down));
        assert_eq!(app.selected_field(), FormField::Value(Biomarker::Hba1c));
        type_text(&mut app, "5.9");

        let effects = app.handle(key(KeyCode::Enter));

        match &effects[..] {
            [Effect::SubmitReading { reading, policy }] => {
                assert_eq!(reading.date, "2024-06-01");
                assert_eq!(reading.values.hba1c, Some(5.9));
                assert_eq!(*policy, SubmitPolicy::FireAndForget);
            }
            other => panic!("unexpected effects: {:?}", other),
        }
        assert_eq!(app.form().text(Biomarker::Hba1c), "");
    }

    #[test]
    fn test_empty_date_blocks_submit() {
        let mut app = app(SubmitPolicy::AwaitPersistence);
        for _ in 0..10 {
            app.handle(key(KeyCode::Backspace));
        }
        let effects = app.handle(key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert!(app.notice().unwrap().is_error);
    }

    #[test]
    fn test_await_policy_resets_on_saved() {
        let mut app = app(SubmitPolicy::AwaitPersistence);
        app.handle(key(KeyCode::Down));
        type_text(&mut app, "1.2");
        app.handle(key(KeyCode::Enter));
        assert_eq!(app.form().text(Biomarker::HsCrp), "1.2");

        app.handle(AppEvent::ReadingSaved {
            date: "2024-06-01".to_string(),
            policy: SubmitPolicy::AwaitPersistence,
            result: Ok(Acknowledgement::default()),
        });

        assert_eq!(app.form().text(Biomarker::HsCrp), "");
        assert!(!app.notice().unwrap().is_error);
    }

    #[test]
    fn test_pending_save_locks_form_inputs() {
        let mut app = app(SubmitPolicy::AwaitPersistence);
        app.handle(key(KeyCode::Down));
        type_text(&mut app, "1");
        assert_eq!(app.handle(key(KeyCode::Enter)).len(), 1);

        app.handle(key(KeyCode::Esc));
        app.handle(key(KeyCode::Backspace));
        type_text(&mut app, "2");
        assert!(app.form().is_submitting());
        assert_eq!(app.form().text(Biomarker::HsCrp), "1");
        assert!(app.handle(key(KeyCode::Enter)).is_empty());

        app.handle(AppEvent::ReadingSaved {
            date: "2024-06-01".to_string(),
            policy: SubmitPolicy::AwaitPersistence,
            result: Ok(Acknowledgement::default()),
        });
        assert!(!app.form().is_submitting());
        type_text(&mut app, "2");
        assert_eq!(app.form().text(Biomarker::HsCrp), "2");
    }

    #[test]
    fn test_live_update_refreshes_everything() {
        let mut app = loaded_app();
        let hub = metabolic_monitor_domain::events::NotificationHub::default();

        let effects = app.handle(AppEvent::ReadingsChanged(hub.publish()));

        assert_eq!(effects.len(), 3);
        assert_eq!(app.last_update().unwrap().sequence, 1);
    }

    #[test]
    fn test_clear_session_then_reading_added() {
        let mut app = loaded_app();

        let effects = app.handle(ctrl('x'));
        assert_eq!(effects, vec![Effect::ClearSession]);
        assert!(app.dashboard().insights().is_none());
        assert_eq!(app.dashboard().message(), Some(NO_DATA_MESSAGE));
        assert!(!app.dashboard().should_auto_fetch());

        let effects = app.handle(AppEvent::ReadingSaved {
            date: "2024-06-01".to_string(),
            policy: SubmitPolicy::FireAndForget,
            result: Ok(Acknowledgement::default()),
        });
        assert!(app.dashboard().should_auto_fetch());
        assert!(effects.iter().any(|e| matches!(e, Effect::FetchInsights(_))));
        assert!(effects.iter().any(|e| matches!(e, Effect::LoadSeries(_))));
    }

    #[test]
    fn test_keyboard_zoom_and_reset() {
        let mut app = loaded_app();
        app.handle(key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::Chart);

        app.handle(key(KeyCode::Char(' ')));
        app.handle(key(KeyCode::Right));
        app.handle(key(KeyCode::Enter));
        assert_eq!(app.chart().visible_points().len(), 2);
        assert_eq!(app.chart().status().label(), "HIGH");

        app.handle(key(KeyCode::Char('r')));
        assert!(app.chart().window().is_full_range());
    }

    #[test]
    fn test_mouse_drag_zooms() {
        let mut app = loaded_app();
        app.set_chart_area(Rect::new(10, 5, 61, 10));

        app.handle(AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 40,
            row: 8,
            modifiers: KeyModifiers::NONE,
        }));
        app.handle(AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 70,
            row: 8,
            modifiers: KeyModifiers::NONE,
        }));
        app.handle(AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 70,
            row: 8,
            modifiers: KeyModifiers::NONE,
        }));

        assert_eq!(app.focus(), Focus::Chart);
        let dates: Vec<_> = app.chart().visible_points().iter().map(|p| p.label.clone()).collect();
        assert_eq!(dates, vec!["Feb 1, 2024", "Mar 1, 2024"]);
    }

    #[test]
    fn test_date_at_column_outside_area() {
        let mut app = loaded_app();
        app.set_chart_area(Rect::new(10, 5, 20, 10));
        assert_eq!(app.date_at_column(5), None);
        assert_eq!(app.date_at_column(30), None);
        assert_eq!(app.date_at_column(10), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(app.date_at_column(29), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_date_at_column_near_u16_limit() {
        let mut app = loaded_app();
        app.set_chart_area(Rect {
            x: u16::MAX - 5,
            y: 0,
            width: 10,
            height: 5,
        });
        assert_eq!(app.date_at_column(u16::MAX - 5), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(app.date_at_column(u16::MAX), None);
    }

    #[test]
    fn test_chat_send_and_failure() {
        let mut app = loaded_app();
        app.handle(key(KeyCode::BackTab));
        assert_eq!(app.focus(), Focus::Chat);

        type_text(&mut app, "What is HbA1c?");
        let effects = app.handle(key(KeyCode::Enter));
        assert_eq!(effects, vec![Effect::SendChat("What is HbA1c?".to_string())]);
        assert_eq!(app.chat().transcript().len(), 1);

        app.handle(AppEvent::ChatReplied(Err(unavailable("POST /api/chat"))));
        assert_eq!(app.chat().transcript().len(), 2);
        assert_eq!(app.chat().transcript()[1].content, CHAT_APOLOGY);
    }

    #[test]
    fn test_quit() {
        let mut app = app(SubmitPolicy::AwaitPersistence);
        app.handle(ctrl('q'));
        assert!(!app.is_running());
    }
}
