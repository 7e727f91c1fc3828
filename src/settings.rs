use config::{Config, ConfigError, Environment, File};
use cricket_services::PollingConfig;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub polling: PollingSettings,
    #[serde(default)]
    pub generator: GeneratorConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    pub interval_ms: u64,
    pub prediction_multiplier: u32,
    pub notification_capacity: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub render_interval_ms: u64,
    pub output: OutputFormat,
    pub pages: Vec<PageKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Dashboard,
    Stats,
    Predictions,
    Analysis,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default values
            .set_default("polling.interval_ms", 5000)?
            .set_default("polling.prediction_multiplier", 2)?
            .set_default("polling.notification_capacity", 64)?
            .set_default("dashboard.render_interval_ms", 5000)?
            .set_default("dashboard.output", "text")?
            .set_default("dashboard.pages", vec!["dashboard", "stats", "predictions", "analysis"])?
            .set_default("logging.filter", "cricket_live=info,cricket_services=info,cricket_dashboard=info")?
            .set_default("logging.format", "pretty")?
            // Add in settings from configuration file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from environment variables, e.g. CRICKET__POLLING__INTERVAL_MS
            .add_source(
                Environment::with_prefix("CRICKET")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::Message("polling.interval_ms must be positive".into()));
        }
        if self.dashboard.render_interval_ms == 0 {
            return Err(ConfigError::Message("dashboard.render_interval_ms must be positive".into()));
        }
        if self.dashboard.pages.is_empty() {
            return Err(ConfigError::Message("dashboard.pages must name at least one page".into()));
        }
        Ok(())
    }

    pub fn polling_config(&self) -> PollingConfig {
        PollingConfig {
            base_interval_ms: self.polling.interval_ms,
            prediction_multiplier: self.polling.prediction_multiplier,
            notification_capacity: self.polling.notification_capacity,
        }
    }
}
