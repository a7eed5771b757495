use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use trade_lens::data::export::{write_long_csv, write_raw, write_raw_csv};
use trade_lens::data::reshape::to_wide;
use trade_lens::menu::Analysis;
use trade_lens::report;
use trade_lens::state::AppState;
use trade_lens::{execute, load_dataset, AnalysisConfig, Direction, MemoryCache, Query, QueryResult};

#[derive(Subcommand)]
enum Commands {
    /// Rank entities of one period by a metric
    Rank {
        #[arg(long)]
        period: String,
        /// Metric label, `exports`, `imports` or a derived metric name
        #[arg(long)]
        field: String,
        #[arg(long, short)]
        n: Option<usize>,
        /// `top` or `bottom`
        #[arg(long, default_value = "top")]
        direction: Direction,
    },
    /// Rank entities by the change of a metric between two periods
    Compare {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        field: String,
        #[arg(long, short)]
        n: Option<usize>,
        #[arg(long, default_value = "top")]
        direction: Direction,
    },
    /// Every period of one entity
    History { entity: Option<String> },
    /// Run one of the numbered dashboard analyses (1-9)
    Menu {
        analysis: Option<Analysis>,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        entity: Option<String>,
    },
    /// Counts and labels of the loaded dataset
    Summary,
    /// Write the normalized long-form table
    Export {
        /// Output path; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Write the wide layout back instead of the long form
        #[arg(long)]
        wide: bool,
    },
}

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Wide CSV with period and metric header rows.
    file: PathBuf,
    /// JSON file overriding the analysis defaults.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let cache = MemoryCache::new();
    let dataset = load_dataset(&args.file, &config, &cache)
        .with_context(|| format!("loading {}", args.file.display()))?;
    let mut state = AppState::new(dataset, &config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match args.command {
        Commands::Rank {
            period,
            field,
            n,
            direction,
        } => execute(
            &state.dataset,
            &Query::RankSingle {
                period,
                field,
                n: n.unwrap_or(config.top_n),
                direction,
            },
        )?,
        Commands::Compare {
            from,
            to,
            field,
            n,
            direction,
        } => execute(
            &state.dataset,
            &Query::CompareAcrossPeriods {
                period_a: from.unwrap_or_else(|| config.compare_from.clone()),
                period_b: to.unwrap_or_else(|| config.compare_to.clone()),
                field,
                n: n.unwrap_or(config.top_n),
                direction,
            },
        )?,
        Commands::History { entity } => execute(
            &state.dataset,
            &Query::EntityHistory {
                entity: entity.unwrap_or_else(|| state.selection.entity.clone()),
            },
        )?,
        Commands::Menu {
            analysis,
            period,
            entity,
        } => {
            let Some(analysis) = analysis else {
                for a in Analysis::ALL {
                    writeln!(out, "{a}")?;
                }
                return Ok(());
            };
            if let Some(period) = period {
                state.select_period(&period)?;
            }
            if let Some(entity) = entity {
                state.select_entity(&entity)?;
            }
            writeln!(out, "{analysis}")?;
            state.run(analysis)?
        }
        Commands::Summary => {
            if args.json {
                serde_json::to_writer_pretty(&mut out, state.dataset.as_ref())?;
                writeln!(out)?;
            } else {
                report::summary(&mut out, &state.dataset)?;
            }
            return Ok(());
        }
        Commands::Export { output, wide } => {
            match (output, wide) {
                (Some(path), true) => {
                    write_raw_csv(&to_wide(&state.dataset), &path, config.delimiter_byte()?)?
                }
                (Some(path), false) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_long_csv(&state.dataset, file)?;
                }
                (None, true) => {
                    write_raw(&to_wide(&state.dataset), &mut out, config.delimiter_byte()?)?
                }
                (None, false) => write_long_csv(&state.dataset, &mut out)?,
            }
            return Ok(());
        }
    };

    print_result(&mut out, &state, &result, args.json)
}

fn print_result<W: Write>(out: &mut W, state: &AppState, result: &QueryResult, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, result).context("serializing result")?;
        writeln!(out)?;
    } else {
        report::render(out, &state.dataset, result)?;
    }
    Ok(())
}
