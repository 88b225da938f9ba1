use std::io::stdout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use dotenv::dotenv;
use metabolic_monitor_dashboard::app::App;
use metabolic_monitor_dashboard::config::{Cli, DashboardConfig};
use metabolic_monitor_dashboard::logging::init_logging;
use metabolic_monitor_dashboard::runtime::{
    await_shutdown, event_channel, forward_notifications, run_event_loop, spawn_input_reader,
    EffectRunner,
};
use metabolic_monitor_data::models::{ReadingRecord, ReadingValues};
use metabolic_monitor_data::{HealthApiTrait, HttpHealthApi, InMemoryHealthApi, SocketIoListener};
use metabolic_monitor_domain::events::{forward_push_events, NotificationHub};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// How long shutdown waits for the push listener to close its session
const LISTENER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Readings the demo backend starts with
fn demo_backend() -> InMemoryHealthApi {
    [
        ("2024-01-12", 5.4, 1.4, 1.3),
        ("2024-04-08", 5.8, 1.7, 1.2),
        ("2024-07-15", 6.1, 1.9, 1.1),
        ("2024-10-21", 5.9, 1.6, 1.2),
    ]
    .into_iter()
    .fold(InMemoryHealthApi::new(), |api, (date, hba1c, tg, hdl)| {
        api.with_reading(ReadingRecord {
            date: date.to_string(),
            values: ReadingValues {
                hba1c: Some(hba1c),
                triglycerides: Some(tg),
                hdl_cholesterol: Some(hdl),
                triglyceride_hdl_ratio: metabolic_monitor_domain::entities::triglyceride_hdl_ratio(
                    Some(tg),
                    Some(hdl),
                ),
                ..Default::default()
            },
        })
    })
}

/// The main entry point for the Metabolic Health Monitor dashboard
///
/// Loads `.env`, parses the command line, starts file logging, connects the
/// backend (or the demo stand-in) and the live-update channel, then runs the
/// terminal UI until the user quits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    let dotenv_loaded = dotenv().is_ok();

    let cli = Cli::parse();
    let _log_guard = init_logging(&cli.log_dir).context("failed to initialise logging")?;
    if !dotenv_loaded {
        info!(".env file not found, using process environment");
    }

    let config = DashboardConfig::load(cli).context("invalid configuration")?;
    info!(
        base_url = %config.client.base_url,
        demo = config.demo,
        submit_mode = %config.submit_policy,
        "Starting Metabolic Health Monitor"
    );

    // Live updates: push events -> hub -> event loop
    let hub = Arc::new(NotificationHub::default());
    let (push_tx, push_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (api, listener): (Arc<dyn HealthApiTrait>, Option<JoinHandle<()>>) = if config.demo {
        (Arc::new(demo_backend().with_push_events(push_tx)), None)
    } else {
        let listener = SocketIoListener::new(&config.client)?;
        let handle = tokio::spawn(listener.run(push_tx, shutdown_rx));
        (Arc::new(HttpHealthApi::new(config.client.clone())?), Some(handle))
    };
    let forwarder = tokio::spawn(forward_push_events(push_rx, hub.clone()));

    let (events_tx, events_rx) = event_channel();
    let notifications = forward_notifications(&hub, events_tx.clone());
    let stop_input = Arc::new(AtomicBool::new(false));
    let input = spawn_input_reader(events_tx.clone(), stop_input.clone());
    let runner = EffectRunner::new(api, events_tx);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Run app
    let mut app = App::new(config.submit_policy, config.demo);
    let result = run_event_loop(&mut terminal, &mut app, &runner, events_rx).await;

    // Restore terminal
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    // Tear down background work
    stop_input.store(true, Ordering::Relaxed);
    let _ = shutdown_tx.send(true);
    if let Some(listener) = listener {
        // Give the listener time to send its close packet
        await_shutdown("push listener", listener, LISTENER_SHUTDOWN_TIMEOUT).await;
    }
    drop(runner);
    notifications.abort();
    forwarder.abort();
    let (_, _) = futures::future::join(notifications, forwarder).await;
    if input.join().is_err() {
        error!("Input thread panicked");
    }

    if let Err(e) = &result {
        error!(error = %e, "Dashboard exited with an error");
    }
    info!("Dashboard shutdown complete");
    result
}
