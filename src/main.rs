use anyhow::{Context, Result};
use clap::Parser;
use graceful_log::{Logger, LoggerConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON5 logger configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit DEBUG messages
    #[arg(short, long)]
    verbose: bool,

    /// End with a CRITICAL message instead of a clean shutdown
    #[arg(long)]
    critical: bool,
}

impl Args {
    fn logger_config(&self) -> Result<LoggerConfig> {
        let mut config = match &self.config {
            Some(path) => LoggerConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => LoggerConfig::default(),
        };
        config.verbose |= self.verbose;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let logger = Logger::start(args.logger_config()?)?;

    // A background worker that keeps reporting until shutdown begins
    let heartbeat = logger.clone();
    let done = logger.done_token();
    logger.spawn_work(async move {
        let mut ticks = tokio::time::interval(Duration::from_millis(250));
        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if heartbeat.debug("heartbeat").await.is_err() {
                        return;
                    }
                }
                _ = done.cancelled() => {
                    let _ = heartbeat.info("heartbeat worker finished").await;
                    return;
                }
            }
        }
    });

    logger.debug("This is a debug message").await?;
    logger.error("This is an error message").await?;
    logger.warning("This is a warning message").await?;
    logger.info("This is an info message").await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    if args.critical {
        logger.critical("This is a critical message").await?;
    } else {
        logger.request_shutdown(None);
    }

    // The logger exits the process once it has drained
    logger.stopped().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_parsing() {
        let args = Args::parse_from(["graceful-log"]);
        assert!(!args.verbose);
        assert!(!args.critical);
        assert!(args.config.is_none());

        let args = Args::parse_from(["graceful-log", "-v", "--critical", "--config", "log.json5"]);
        assert!(args.verbose);
        assert!(args.critical);
        assert_eq!(args.config, Some(PathBuf::from("log.json5")));
    }

    #[test]
    fn test_verbose_flag_overrides_config() {
        let args = Args::parse_from(["graceful-log", "--verbose"]);
        let config = args.logger_config().unwrap();
        assert!(config.verbose);
        assert_eq!(config.capacity, 100);
    }
}
