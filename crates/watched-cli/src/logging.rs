use anyhow::Result;
use std::io;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};
use watched_config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Send diagnostics to stderr, and to a daily-rotated file when one is configured.
///
/// Stdout is reserved for the JSON result, so nothing here ever writes to it.
pub fn init_logging(verbose_level: u8, quiet: bool, config: &LoggingConfig) -> Result<()> {
    let json = use_json(config);
    let mut layers = vec![stderr_layer(json)];

    if let Some(log_path) = &config.file {
        layers.push(file_layer(log_path, json)?);
    }

    Registry::default()
        .with(layers)
        .with(build_filter(verbose_level, quiet, config))
        .init();

    Ok(())
}

/// Stderr-only variant used when the log file cannot be opened
pub fn init_stderr_logging(verbose_level: u8, quiet: bool, config: &LoggingConfig) {
    Registry::default()
        .with(vec![stderr_layer(use_json(config))])
        .with(build_filter(verbose_level, quiet, config))
        .init();
}

fn build_filter(verbose_level: u8, quiet: bool, config: &LoggingConfig) -> EnvFilter {
    // 0 = info (or configured level), 1 = debug with hyper noise suppressed, 2+ = trace
    if quiet {
        return EnvFilter::new("error");
    }

    let default = match verbose_level {
        0 => config.level.clone().unwrap_or_else(|| "info".to_string()),
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn".to_string(),
        _ => "trace".to_string(),
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn use_json(config: &LoggingConfig) -> bool {
    std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .ok()
        .or(config.json)
        .unwrap_or(false)
}

fn stderr_layer(json: bool) -> BoxedLayer {
    if json {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .boxed()
    }
}

fn file_layer(log_path: &Path, json: bool) -> Result<BoxedLayer> {
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(log_dir)?;

    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;

    // Rotation prefix drops the extension: serializd-watched.log -> serializd-watched.2026-10-19
    let log_prefix = log_filename.rsplitn(2, '.').nth(1).unwrap_or(log_filename);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);

    let layer = if json {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(file_appender)
            .boxed()
    } else {
        fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(file_appender)
            .boxed()
    };
    Ok(layer)
}
