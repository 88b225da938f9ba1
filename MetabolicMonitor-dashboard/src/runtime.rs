use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event};
use metabolic_monitor_data::HealthApiTrait;
use metabolic_monitor_domain::events::NotificationHub;
use metabolic_monitor_domain::services::{
    clear_history, fetch_insights, load_history, load_series, load_transcript, send_message,
    submit_reading,
};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::{App, AppEvent, Effect};
use crate::ui;

/// How often the input thread checks whether it should stop
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs effects as tokio tasks and reports results back to the event loop
#[derive(Clone)]
pub struct EffectRunner {
    api: Arc<dyn HealthApiTrait>,
    events: UnboundedSender<AppEvent>,
}

impl EffectRunner {
    pub fn new(api: Arc<dyn HealthApiTrait>, events: UnboundedSender<AppEvent>) -> Self {
        Self { api, events }
    }

    /// Start an effect without waiting for it
    pub fn spawn(&self, effect: Effect) -> JoinHandle<()> {
        let runner = self.clone();
        tokio::spawn(async move { runner.execute(effect).await })
    }

    /// Perform an effect and deliver its result
    pub async fn execute(&self, effect: Effect) {
        debug!(effect = ?effect, "Running effect");
        let api = self.api.as_ref();

        let event = match effect {
            Effect::LoadSeries(token) => AppEvent::SeriesLoaded(token, load_series(api).await),
            Effect::FetchInsights(token) => AppEvent::InsightsLoaded(token, fetch_insights(api).await),
            Effect::LoadTranscript(token) => {
                AppEvent::TranscriptLoaded(token, load_transcript(api).await)
            }
            Effect::LoadHistory(token) => AppEvent::TranscriptLoaded(token, load_history(api).await),
            Effect::SubmitReading { reading, policy } => AppEvent::ReadingSaved {
                result: submit_reading(api, &reading).await,
                date: reading.date,
                policy,
            },
            Effect::SendChat(message) => AppEvent::ChatReplied(send_message(api, message).await),
            Effect::ClearChat => AppEvent::ChatCleared(clear_history(api).await),
            Effect::ClearSession => AppEvent::SessionCleared(api.clear_all_readings().await),
        };

        if self.events.send(event).is_err() {
            debug!("Event loop gone, dropping effect result");
        }
    }
}

/// Deliver every hub notification to the event loop
///
/// A subscriber that lagged behind still gets one notification, since any
/// number of missed changes calls for a single refresh.
pub fn forward_notifications(hub: &NotificationHub, events: UnboundedSender<AppEvent>) -> JoinHandle<()> {
    let mut notifications = hub.subscribe();
    tokio::spawn(async move {
        loop {
            let notification = match notifications.recv().await {
                Ok(notification) => notification,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live updates lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if events.send(AppEvent::ReadingsChanged(notification)).is_err() {
                break;
            }
        }
        debug!("Notification forwarding stopped");
    })
}

/// Read terminal input on a dedicated thread
///
/// Crossterm's reader blocks, so it stays off the runtime. The thread exits
/// once `stop` is set or the event loop is gone.
pub fn spawn_input_reader(events: UnboundedSender<AppEvent>, stop: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            let ready = match event::poll(INPUT_POLL_INTERVAL) {
                Ok(ready) => ready,
                Err(e) => {
                    warn!(error = %e, "Failed to poll terminal input");
                    break;
                }
            };
            if !ready {
                continue;
            }

            let app_event = match event::read() {
                Ok(Event::Key(key)) => AppEvent::Key(key),
                Ok(Event::Mouse(mouse)) => AppEvent::Mouse(mouse),
                Ok(Event::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "Failed to read terminal input");
                    break;
                }
            };
            if events.send(app_event).is_err() {
                break;
            }
        }
    })
}

/// Drive the app until it quits or every event source is gone
pub async fn run_event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &EffectRunner,
    mut events: UnboundedReceiver<AppEvent>,
) -> anyhow::Result<()> {
    for effect in app.mount() {
        runner.spawn(effect);
    }

    while app.is_running() {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let Some(event) = events.recv().await else {
            info!("All event sources closed");
            break;
        };
        for effect in app.handle(event) {
            runner.spawn(effect);
        }
    }

    Ok(())
}

/// Wait up to `limit` for a background task to finish
///
/// Returns `true` if the task ended on its own within the limit.
pub async fn await_shutdown(name: &'static str, handle: JoinHandle<()>, limit: Duration) -> bool {
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(())) => {
            info!(task = name, "Background task stopped");
            true
        }
        Ok(Err(e)) => {
            warn!(task = name, error = %e, "Background task failed");
            false
        }
        Err(_) => {
            warn!(task = name, "Background task did not stop in time");
            false
        }
    }
}

/// Channel carrying every event into the loop
pub fn event_channel() -> (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabolic_monitor_domain::services::{InsightOutcome, SubmitPolicy};
    use metabolic_monitor_domain::testing::{
        hba1c_record, insights_response, sample_insights, seeded_backend, unavailable, InMemoryHealthApi,
        MockHealthApi,
    };
    use metabolic_monitor_domain::entities::{BiomarkerValues, Reading};
    use metabolic_monitor_domain::services::RefreshTracker;
    use ratatui::backend::TestBackend;

    fn runner(api: impl HealthApiTrait + 'static) -> (EffectRunner, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = event_channel();
        (EffectRunner::new(Arc::new(api), tx), rx)
    }

    #[tokio::test]
    async fn test_load_series_effect() {
        let (runner, mut rx) = runner(seeded_backend(&[("2024-02-01", 6.0), ("2024-01-01", 5.0)]));
        let token = RefreshTracker::new().issue();

        runner.execute(Effect::LoadSeries(token)).await;

        match rx.recv().await.unwrap() {
            AppEvent::SeriesLoaded(got, Ok(points)) => {
                assert_eq!(got, token);
                assert_eq!(points.len(), 2);
                assert_eq!(points[0].value, 5.0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_insights_effect_parses_document() {
        let mut api = MockHealthApi::new();
        api.expect_generate_insights()
            .times(1)
            .returning(|| Ok(insights_response(&sample_insights())));
        let (runner, mut rx) = runner(api);
        let token = RefreshTracker::new().issue();

        runner.execute(Effect::FetchInsights(token)).await;

        match rx.recv().await.unwrap() {
            AppEvent::InsightsLoaded(got, InsightOutcome::Loaded(insights)) => {
                assert_eq!(got, token);
                assert_eq!(insights, sample_insights());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_insights_failure_effect() {
        let mut api = MockHealthApi::new();
        api.expect_generate_insights()
            .returning(|| Err(unavailable("POST /api/generate_insights")));
        let (runner, mut rx) = runner(api);

        runner.execute(Effect::FetchInsights(RefreshTracker::new().issue())).await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::InsightsLoaded(_, InsightOutcome::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_effect_reports_date_and_policy() {
        let backend = InMemoryHealthApi::new();
        let (runner, mut rx) = runner(backend.clone());
        let reading = Reading::new(
            "2024-04-02",
            BiomarkerValues {
                hba1c: Some(5.4),
                ..Default::default()
            },
        );

        runner
            .execute(Effect::SubmitReading {
                reading,
                policy: SubmitPolicy::FireAndForget,
            })
            .await;

        match rx.recv().await.unwrap() {
            AppEvent::ReadingSaved { date, policy, result } => {
                assert_eq!(date, "2024-04-02");
                assert_eq!(policy, SubmitPolicy::FireAndForget);
                assert!(result.is_ok());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(backend.get_readings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_forward_notifications() {
        let hub = NotificationHub::default();
        let (tx, mut rx) = event_channel();
        let handle = forward_notifications(&hub, tx);

        let published = hub.publish();

        match rx.recv().await.unwrap() {
            AppEvent::ReadingsChanged(notification) => assert_eq!(notification, published),
            other => panic!("unexpected event: {:?}", other),
        }
        drop(hub);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_await_shutdown_waits_for_task() {
        let finishing = tokio::spawn(tokio::time::sleep(Duration::from_millis(50)));
        assert!(await_shutdown("finishing", finishing, Duration::from_secs(2)).await);

        let stuck = tokio::spawn(std::future::pending::<()>());
        assert!(!await_shutdown("stuck", stuck, Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn test_event_loop_round_trip() {
        let backend = seeded_backend(&[("2024-01-05", 5.5)]).with_reading(hba1c_record("2024-03-10", 6.7));
        let (tx, rx) = event_channel();
        let runner = EffectRunner::new(Arc::new(backend), tx.clone());
        let mut terminal = Terminal::new(TestBackend::new(120, 50)).unwrap();
        let mut app = App::new(SubmitPolicy::AwaitPersistence, true);

        let quit = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = tx.send(AppEvent::Key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char('q'),
                crossterm::event::KeyModifiers::CONTROL,
            )));
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            run_event_loop(&mut terminal, &mut app, &runner, rx),
        )
        .await
        .unwrap()
        .unwrap();
        quit.await.unwrap();

        assert!(!app.is_running());
        assert_eq!(app.chart().points().len(), 2);
        assert!(app.dashboard().insights().is_some());
    }
}
