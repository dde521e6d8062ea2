//! CLI entrypoint for selfcheck
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod app;

use anyhow::{Result, anyhow};
use app::App;
use clap::Parser;
use selfcheck_application::{
    ActivityLogger, Clock, NoActivityLog, RunMirror, RunStore, SurveyMirror, SurveyRepository,
    SystemClock,
};
use selfcheck_domain::OwnerScope;
use selfcheck_infrastructure::{
    ConfigLoader, DocumentStoreMirror, FileConfig, InMemoryRunRepository,
    InMemorySurveyRepository, JsonFileStore, JsonlActivityLogger, LocalRunRepository,
    LocalSurveyRepository,
};
use selfcheck_presentation::{Cli, Command, OutputConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so the file log location is known
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.dir.as_deref());
    info!("Starting selfcheck");

    for issue in config.validate() {
        warn!("Configuration: {}", issue);
    }

    if matches!(cli.command, Command::ShowConfig) {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let output = OutputConfig::new(config.output.format, config.output.color)
        .with_flags(cli.json, cli.no_color);
    output.apply_color();

    let scope = match cli.owner.as_deref() {
        Some(owner) => OwnerScope::from_uid(Some(owner)),
        None => config.storage.owner_scope(),
    };
    debug!("Owner scope: {}", scope);

    // === Dependency Injection ===
    let app = build_app(&config, scope, output, cli.ephemeral);

    if config.survey.seed_default {
        let seeded = app.save_use_case().seed_if_empty().await?;
        if seeded {
            info!("Seeded the default blueprint");
        }
    }

    app.run(cli.command).await
}

/// Stderr logging filtered by `-v`, plus a daily file log when configured.
fn init_logging(verbose: u8, dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "selfcheck.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn build_app(config: &FileConfig, scope: OwnerScope, output: OutputConfig, ephemeral: bool) -> App {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let data_dir = config.storage.resolved_data_dir();

    let (surveys, runs): (Arc<dyn SurveyRepository>, Arc<dyn RunStore>) = if ephemeral {
        debug!("Using in-memory storage");
        (
            Arc::new(InMemorySurveyRepository::new()),
            Arc::new(InMemoryRunRepository::new()),
        )
    } else {
        debug!("Using local storage in {}", data_dir.display());
        (
            Arc::new(LocalSurveyRepository::new(JsonFileStore::new(&data_dir))),
            Arc::new(LocalRunRepository::new(JsonFileStore::new(&data_dir))),
        )
    };

    let mirror: Option<Arc<DocumentStoreMirror>> = match &config.storage.mirror_dir {
        Some(dir) if !ephemeral => {
            debug!("Mirroring runs and blueprints to {}", dir.display());
            Some(Arc::new(DocumentStoreMirror::new(
                JsonFileStore::new(dir),
                clock.clone(),
            )))
        }
        _ => None,
    };

    let activity: Arc<dyn ActivityLogger> = match config.logging.activity_log_path(&data_dir) {
        Some(path) if !ephemeral => match JsonlActivityLogger::open(&path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!("Activity log unavailable at {}", path.display());
                Arc::new(NoActivityLog)
            }
        },
        _ => Arc::new(NoActivityLog),
    };

    let run_mirror = mirror.clone().map(|m| m as Arc<dyn RunMirror>);
    let survey_mirror = mirror.map(|m| m as Arc<dyn SurveyMirror>);

    App::new(scope, output, surveys, runs, clock)
        .with_mirror(run_mirror)
        .with_survey_mirror(survey_mirror)
        .with_activity_logger(activity)
        .with_behavior(config.survey.to_behavior())
}
