use crate::config::SettingsLayer;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "comfy-days")]
#[command(about = "Count comfortable days at US weather stations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v debug, -vv trace)"
    )]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only log warnings and hide progress bars")]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        default_value = "env",
        help = "Directory of layered YAML settings files"
    )]
    pub env_dir: PathBuf,
}

impl Cli {
    /// Level for the `comfy_days` log target; flags beat the configured level
    pub fn log_level(&self, configured: &str) -> String {
        if self.quiet {
            return "warn".to_string();
        }
        match self.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify the station files of one shard into the spool
    Run {
        #[arg(short, long, help = "Directory of station CSV files")]
        input_dir: Option<PathBuf>,

        #[arg(short, long, help = "Spool directory")]
        spool_dir: Option<PathBuf>,

        #[arg(long, help = "Shard pattern over filename digests (e.g. '0a*')")]
        shard: Option<String>,

        #[arg(long, help = "Additional input file glob, appended to the configured ones")]
        file_glob: Vec<String>,

        #[arg(long, help = "Reprocess stations already in the spool")]
        overwrite: bool,

        #[arg(long, help = "Worker threads [default: CPU count]")]
        max_workers: Option<usize>,
    },

    /// Fold every spooled station year into the summary table
    Finalize {
        #[arg(short, long, help = "Spool directory")]
        spool_dir: Option<PathBuf>,

        #[arg(long, help = "Summary file name inside the comfy stage")]
        filename: Option<String>,

        #[arg(long, help = "Rebuild an existing summary table")]
        overwrite: bool,
    },

    /// Print filename digests or the prefix patterns for parallel workers
    Shard {
        #[arg(help = "Station file names to hash")]
        filenames: Vec<String>,

        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(0..=4),
            help = "List every shard pattern with a prefix of this length"
        )]
        prefixes: Option<u32>,
    },

    /// Print a histogram of one summary-table column
    Report {
        #[arg(short, long, help = "Spool directory")]
        spool_dir: Option<PathBuf>,

        #[arg(short, long, help = "Summary CSV [default: <spool>/comfy/<summary filename>]")]
        file: Option<PathBuf>,

        #[arg(short, long, default_value = "total_comfy_days")]
        column: String,

        #[arg(short, long, default_value = "20")]
        buckets: usize,

        #[arg(long, requires = "max", help = "Lower bound of the histogram range")]
        min: Option<f64>,

        #[arg(long, requires = "min", help = "Upper bound of the histogram range")]
        max: Option<f64>,
    },
}

impl Commands {
    /// Settings given on the command line, the last configuration layer
    pub fn overrides(&self) -> SettingsLayer {
        let mut layer = SettingsLayer::default();
        match self {
            Commands::Run {
                input_dir,
                spool_dir,
                shard,
                file_glob,
                overwrite,
                max_workers,
            } => {
                layer.input.dir = input_dir.clone();
                layer.spool.dir = spool_dir.clone();
                layer.run.shard = shard.clone();
                if !file_glob.is_empty() {
                    layer.input.file_globs = Some(file_glob.clone());
                }
                layer.run.overwrite = overwrite.then_some(true);
                layer.run.max_workers = *max_workers;
            }
            Commands::Finalize {
                spool_dir,
                filename,
                overwrite,
            } => {
                layer.spool.dir = spool_dir.clone();
                layer.summary.filename = filename.clone();
                layer.run.overwrite = overwrite.then_some(true);
            }
            Commands::Report { spool_dir, .. } => {
                layer.spool.dir = spool_dir.clone();
            }
            Commands::Shard { .. } => {}
        }
        layer
    }
}
