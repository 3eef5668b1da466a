use crate::analyzers::ComfortReport;
use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::processors::{
    prefix_patterns, shard_of, FinalizeOutcome, Orchestrator, RunReport, ShardSelector,
    SummaryBuilder,
};
use crate::spool::{SpoolCache, Stage};
use crate::utils::constants::DEFAULT_LOG_LEVEL;
use crate::utils::progress::ProgressReporter;
use tracing::{debug, info, warn};
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Changes the active log filter once settings are resolved
pub type LogHandle = reload::Handle<EnvFilter, Registry>;

pub async fn run(cli: Cli) -> Result<()> {
    // Started from the flags alone so that config loading is logged too
    let handle = setup_logging(&cli.log_level(DEFAULT_LOG_LEVEL), cli.quiet);
    let settings = Settings::load(&cli.env_dir, cli.command.overrides())?;
    if let Some(handle) = &handle {
        set_log_level(handle, &cli.log_level(&settings.log_level));
    }
    debug!("Resolved settings: {:?}", settings);

    match cli.command {
        Commands::Run { .. } => run_shard(settings, cli.quiet).await,

        Commands::Finalize { .. } => {
            let outcome = tokio::task::spawn_blocking(move || -> Result<FinalizeOutcome> {
                let spool = SpoolCache::from_settings(&settings, settings.overwrite)?;
                SummaryBuilder::new(settings.summary.clone()).finalize(&spool, settings.overwrite)
            })
            .await??;

            match outcome {
                FinalizeOutcome::AlreadyPresent(path) => println!(
                    "Summary already present at {} (use --overwrite to rebuild)",
                    path.display()
                ),
                FinalizeOutcome::Written { path, stations } => {
                    println!("Wrote {} stations to {}", stations, path.display())
                }
            }
            Ok(())
        }

        Commands::Shard {
            filenames,
            prefixes,
        } => {
            if let Some(len) = prefixes {
                for pattern in prefix_patterns(len) {
                    println!("{}", pattern);
                }
            }
            for filename in filenames {
                println!("{}  {}", shard_of(&filename), filename);
            }
            Ok(())
        }

        Commands::Report {
            file,
            column,
            buckets,
            min,
            max,
            ..
        } => {
            let path = file.unwrap_or_else(|| {
                settings
                    .spool_dir
                    .join(Stage::Comfy.dir_name())
                    .join(&settings.summary.filename)
            });
            info!("Reading {}", path.display());

            let histogram = ComfortReport::new(buckets).analyze(&path, &column, min.zip(max))?;
            println!("{}", histogram.summary());
            Ok(())
        }
    }
}

async fn run_shard(settings: Settings, quiet: bool) -> Result<()> {
    // An invalid pattern aborts before any station is read
    let shard = ShardSelector::new(&settings.shard)?;

    info!(
        "Processing {} into {} (shard '{}', overwrite={}, workers={})",
        settings.input_dir.display(),
        settings.spool_dir.display(),
        shard.pattern(),
        settings.overwrite,
        settings.max_workers
    );

    let report = tokio::task::spawn_blocking(move || -> Result<RunReport> {
        let spool = SpoolCache::from_settings(&settings, settings.overwrite)?;
        let progress = ProgressReporter::new(0, "Scanning station files...", quiet);
        Orchestrator::new(&settings).run(&spool, &shard, Some(&progress))
    })
    .await??;

    println!("\n{}", report);
    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` takes precedence over `level`.
///
/// Returns `None` when a subscriber is already installed.
pub fn setup_logging(level: &str, quiet: bool) -> Option<LogHandle> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let (filter, handle) = reload::Layer::new(level_filter(level));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    match result {
        Ok(()) => {
            debug!("Logging initialized at level: {}", level);
            Some(handle)
        }
        Err(_) => None,
    }
}

pub fn set_log_level(handle: &LogHandle, level: &str) {
    match handle.reload(level_filter(level)) {
        Ok(()) => debug!("Log level set to {}", level),
        Err(e) => warn!("Could not change log level to {}: {}", level, e),
    }
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("comfy_days={}", level)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_log_level_follows_resolved_settings() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let Some(handle) = setup_logging("info", true) else {
            return;
        };

        assert!(tracing::enabled!(Level::INFO));
        assert!(!tracing::enabled!(Level::DEBUG));

        set_log_level(&handle, "debug");
        assert!(tracing::enabled!(Level::DEBUG));

        set_log_level(&handle, "warn");
        assert!(!tracing::enabled!(Level::INFO));
    }
}
