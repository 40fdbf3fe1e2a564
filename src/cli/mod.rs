use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemadiff::api::{self, CompareOptions, SnapshotOptions, Source};
use schemadiff::config::{Config, Side, DEFAULT_CONFIG_FILE};
use schemadiff::drift::DiscardSink;
use schemadiff::filter::Filter;
use schemadiff::model::MetadataCategory;
use schemadiff::report::{render_json, render_summary, TextSink};

#[derive(Parser)]
#[command(name = "schemadiff")]
#[command(about = "Compare the metadata of two MySQL schemas", long_about = None)]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Config file with [Servers.1] and [Servers.2] (default: config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Left side: mysql:// URL, snapshot:<path>, or a .json snapshot
    #[arg(long, env = "SCHEMADIFF_LEFT")]
    left: Option<String>,

    /// Right side: mysql:// URL, snapshot:<path>, or a .json snapshot
    #[arg(long, env = "SCHEMADIFF_RIGHT")]
    right: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two schemas and report differences
    Compare {
        #[command(flatten)]
        sources: SourceArgs,

        /// Schema on the left side (default: SchemaName1 or the URL's database)
        #[arg(long)]
        left_schema: Option<String>,

        /// Schema on the right side (default: SchemaName2 or the URL's database)
        #[arg(long)]
        right_schema: Option<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only compare tables, triggers and functions matching these globs
        #[arg(long)]
        include: Vec<String>,

        /// Ignore tables, triggers and functions matching these globs
        #[arg(long)]
        exclude: Vec<String>,

        /// Categories not to compare (tables, triggers, functions, columns, indexes)
        #[arg(long, value_delimiter = ',')]
        skip: Vec<MetadataCategory>,

        /// Report failed comparisons as "not compared" instead of stopping
        #[arg(long)]
        keep_going: bool,

        /// Exit with status 1 when drift is found
        #[arg(long)]
        exit_code: bool,
    },

    /// Save one schema's metadata names to a JSON snapshot
    Snapshot {
        #[command(flatten)]
        sources: SourceArgs,

        /// Which configured side to capture
        #[arg(long, value_enum, default_value = "left")]
        side: SideArg,

        #[arg(long)]
        schema: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Verify both sides can be reached
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

fn init_logging(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }
    Ok(())
}

struct Resolved {
    config: Option<Config>,
    sources: SourceArgs,
}

impl Resolved {
    fn load(sources: SourceArgs) -> Result<Self> {
        let path = match &sources.config {
            Some(path) => Some(path.clone()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };
        let config = path
            .map(|path| {
                tracing::info!(config = %path.display(), "loading configuration");
                Config::from_file(&path)
            })
            .transpose()?;
        Ok(Self { config, sources })
    }

    fn source(&self, side: Side) -> Result<Source> {
        let explicit = match side {
            Side::Left => self.sources.left.as_deref(),
            Side::Right => self.sources.right.as_deref(),
        };
        if let Some(value) = explicit {
            return Ok(Source::parse(value)?);
        }
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| anyhow!("No --{side} source given and no config file found"))?;
        let server = config.server(side)?;
        Ok(Source::Options(Box::new(server.connect_options())))
    }

    fn schema(&self, side: Side, explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| {
            self.config
                .as_ref()
                .and_then(|config| config.schema(side))
                .map(str::to_string)
        })
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Compare {
            sources,
            left_schema,
            right_schema,
            format,
            include,
            exclude,
            skip,
            keep_going,
            exit_code,
        } => {
            let resolved = Resolved::load(sources)?;
            let filter = Filter::new(&include, &exclude)
                .map_err(|e| api::Error::invalid_filter(e.to_string()))?
                .with_skipped(skip);

            let mut options = CompareOptions::new(
                resolved.source(Side::Left)?,
                resolved.source(Side::Right)?,
            )
            .with_filter(filter);
            options.left_schema = resolved.schema(Side::Left, left_schema);
            options.right_schema = resolved.schema(Side::Right, right_schema);
            options.keep_going = keep_going;

            let result = match format {
                OutputFormat::Text => {
                    let mut sink = TextSink::new(std::io::stdout());
                    let result = api::compare_with_sink(options, &mut sink).await?;
                    println!("{}", render_summary(&result.report));
                    result
                }
                OutputFormat::Json => {
                    let result = api::compare_with_sink(options, &mut DiscardSink).await?;
                    println!("{}", render_json(&result.report)?);
                    result
                }
            };

            if exit_code && result.has_drift {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Snapshot {
            sources,
            side,
            schema,
            output,
        } => {
            let resolved = Resolved::load(sources)?;
            let side = Side::from(side);
            let mut options = SnapshotOptions::new(resolved.source(side)?);
            options.schema = resolved.schema(side, schema);

            let snapshot = api::snapshot(options).await?;
            snapshot.write_to(&output)?;
            println!(
                "Snapshot of {} written to {} ({} tables)",
                snapshot.schema,
                output.display(),
                snapshot.tables.len()
            );
            Ok(())
        }
        Commands::Check { sources } => {
            let resolved = Resolved::load(sources)?;
            let mut failed = false;
            for side in [Side::Left, Side::Right] {
                let checked = match resolved.source(side) {
                    Ok(source) => api::check_connection(&source).await.map_err(anyhow::Error::from),
                    Err(e) => Err(e),
                };
                match checked {
                    Ok(check) => println!("{side}: ok ({})", check.server),
                    Err(e) => {
                        failed = true;
                        println!("{side}: failed ({e})");
                    }
                }
            }
            if failed {
                bail!("connection check failed");
            }
            Ok(())
        }
    }
}
