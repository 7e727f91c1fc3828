mod settings;

use anyhow::Result;
use cricket_dashboard::{AnalysisPage, DashboardPage, Page, PredictionsPage, StatsPage};
use cricket_services::{top_performers, MockDataGenerator, PollingService};
use cricket_stream::{Notification, NotificationLevel};
use settings::{AppConfig, LogFormat, OutputFormat, PageKind};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::new()?;
    init_tracing(&config.logging.filter, config.logging.format);

    info!("🏏 Starting Cricket Live dashboard");
    info!("✅ Configuration loaded successfully");
    info!("🔄 Polling every {}ms", config.polling.interval_ms);
    if let Some(seed) = config.generator.seed {
        info!("🎲 Mock data seed: {}", seed);
    }

    let source = Arc::new(MockDataGenerator::from_seed(config.generator.seed));
    let service = PollingService::new(source, config.polling_config())?;

    // Surface non-fatal notifications as toasts in the log
    let mut notifications = service.notifications();
    let toast_handle = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(notification) => log_notification(&notification),
                Err(RecvError::Lagged(skipped)) => warn!("🔔 Missed {} notifications", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let pages = mount_pages(&service, &config.dashboard.pages);
    info!("✅ Mounted {} pages", pages.len());
    info!("⌨️  Press Ctrl+C to stop");

    let mut render_ticker = interval(Duration::from_millis(config.dashboard.render_interval_ms));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = render_ticker.tick() => render_pages(&pages, config.dashboard.output)?,
            result = &mut shutdown => {
                result?;
                break;
            }
        }
    }

    info!("👋 Shutting down gracefully");

    // Unmounting drops every subscription, which stops the timers on its own;
    // cleanup covers anything started explicitly.
    drop(pages);
    service.log_summary();
    service.cleanup();
    toast_handle.abort();

    Ok(())
}

fn init_tracing(default_filter: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

fn log_notification(notification: &Notification) {
    match notification.level {
        NotificationLevel::Info => info!("🔔 {}", notification),
        NotificationLevel::Warning => warn!("🔔 {}", notification),
        NotificationLevel::Error => error!("🔔 {}", notification),
    }
}

fn mount_pages(service: &PollingService, kinds: &[PageKind]) -> Vec<Box<dyn Page>> {
    kinds
        .iter()
        .map(|kind| -> Box<dyn Page> {
            match kind {
                PageKind::Dashboard => Box::new(DashboardPage::mount(service)),
                PageKind::Stats => Box::new(StatsPage::mount(service, top_performers())),
                PageKind::Predictions => Box::new(PredictionsPage::mount(service)),
                PageKind::Analysis => Box::new(AnalysisPage::mount(service)),
            }
        })
        .collect()
}

fn render_pages(pages: &[Box<dyn Page>], output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Text => {
            for page in pages {
                println!("{}\n", page.render());
            }
        }
        OutputFormat::Json => {
            let mut snapshot = serde_json::Map::new();
            for page in pages {
                snapshot.insert(page.title().to_lowercase(), page.to_json()?);
            }
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }
    Ok(())
}
