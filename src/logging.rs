use std::error::Error;

use crag_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "crag.log";

/// Install the global subscriber.
///
/// `-v` / `-vv` force debug / trace; otherwise `RUST_LOG` wins over
/// `logging.level`. Console output goes to stderr so streamed answers on
/// stdout stay clean. The returned guard flushes the file sink and must be
/// held until exit.
pub fn init(config: &LoggingConfig, verbose: u8) -> Result<Option<WorkerGuard>, Box<dyn Error>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?,
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let (json_layer, text_layer) = if config.json {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (
            None,
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
        )
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}
