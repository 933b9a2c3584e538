use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use endorsement_ranker::config::Settings;
use endorsement_ranker::filter::{self, FilterSet, Predicate};
use endorsement_ranker::report;
use endorsement_ranker::{engine, AppState, Criterion, CriterionWeights, NamingConvention, RankedTable};

#[derive(Parser)]
#[command(name = "endorsement-ranker")]
#[command(about = "Ranks Indonesian YouTube channels by endorsement potential", long_about = None)]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true, env = "ENDORSEMENT_CONFIG")]
    config: Option<PathBuf>,
    /// Channel metrics CSV, overrides the settings file
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Column naming convention of the CSV
    #[arg(long, global = true, value_enum)]
    naming: Option<NamingConvention>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct Tuning {
    #[arg(long)]
    min_subscribers: Option<f64>,
    #[arg(long)]
    min_engagement: Option<f64>,
    /// Criterion weight as `criterion=value`, may be repeated
    #[arg(long = "weight", value_parser = parse_weight)]
    weights: Vec<(Criterion, f64)>,
}

impl Tuning {
    fn apply(&self, settings: &mut Settings) {
        if let Some(min) = self.min_subscribers {
            settings.filters.min_subscribers = Some(min);
        }
        if let Some(min) = self.min_engagement {
            settings.filters.min_engagement = Some(min);
        }
        settings.weights.extend(self.weights.iter().copied());
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain the scoring criteria and default weights
    Methodology,
    /// Rank channels by endorsement score
    Rank {
        #[command(flatten)]
        tuning: Tuning,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Find ranked channels by name
    Search {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Write the ranked table as CSV
    Export {
        #[command(flatten)]
        tuning: Tuning,
        /// Only export the first N channels
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        tuning: Tuning,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn parse_weight(raw: &str) -> Result<(Criterion, f64), String> {
    let (criterion, weight) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `criterion=value`, got `{raw}`"))?;
    let criterion = criterion.parse::<Criterion>()?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid weight `{weight}`: {err}"))?;
    Ok((criterion, weight))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Filters the raw table, then scores what remains so min-max bounds follow
/// the filtered rows.
fn rank(
    state: &AppState,
    settings: &Settings,
    tuning: &Tuning,
) -> anyhow::Result<(RankedTable, CriterionWeights)> {
    let mut settings = settings.clone();
    tuning.apply(&mut settings);

    let table = state
        .table_or_load()
        .with_context(|| format!("failed to load {}", state.data_path().display()))?;
    let mapping = state.mapping();

    let filtered = filter::filter_channels(table, &settings.filters(mapping))?;
    let weights = mapping.weights_for(&filtered.table, &settings.weights());
    debug!(total = weights.total(), "criterion weights resolved");

    let ranked = engine::score(&filtered.table, &weights).context("failed to score channels")?;
    Ok((ranked, weights))
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(path) = cli.data {
        settings.data.path = path;
    }
    if let Some(naming) = cli.naming {
        settings.data.naming = naming;
    }

    let mut state = AppState::new(settings.data.path.clone(), settings.mapping());

    if let Commands::Methodology = cli.command {
        print!("{}", report::build_methodology());
        return Ok(());
    }

    state.open_dashboard();
    debug!(view = ?state.view(), "dashboard opened");

    match cli.command {
        Commands::Methodology => {}
        Commands::Rank {
            tuning,
            limit,
            format,
        } => {
            let (ranked, _) = rank(&state, &settings, &tuning)?;
            let limit = limit.unwrap_or(settings.report.top);

            match format {
                Format::Json => {
                    println!("{}", serde_json::to_string_pretty(&ranked.top(limit))?);
                }
                Format::Text => {
                    if ranked.is_empty() {
                        println!("No channels match the selected filters.");
                        return Ok(());
                    }

                    println!("Top channels by endorsement score:");
                    for record in ranked.records.iter().take(limit) {
                        println!("{}. {} score {:.4}", record.rank, record.name, record.score);
                    }
                }
            }
        }
        Commands::Search { name, tuning } => {
            let (ranked, _) = rank(&state, &settings, &tuning)?;
            let found =
                filter::filter_ranked(&ranked, &FilterSet::new().and(Predicate::name_contains(&name)))?;

            if found.is_empty_result() {
                println!("No channel matches '{name}'.");
                return Ok(());
            }

            println!("Results for '{name}':");
            for record in &found.table.records {
                println!("{}. {} score {:.3}", record.rank, record.name, record.score);
            }
        }
        Commands::Export { tuning, top, out } => {
            let (ranked, _) = rank(&state, &settings, &tuning)?;
            let (table, prefix) = match top {
                Some(n) => (ranked.top(n), report::top_export_prefix(n)),
                None => (ranked, report::FULL_EXPORT_PREFIX.to_string()),
            };
            let out = out.unwrap_or_else(|| {
                let now = chrono::Local::now().naive_local();
                PathBuf::from(report::export_file_name(&prefix, now))
            });

            let file = File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            report::write_export(&table, BufWriter::new(file))?;
            println!("Exported {} channels to {}.", table.len(), out.display());
        }
        Commands::Report { tuning, out } => {
            let (ranked, weights) = rank(&state, &settings, &tuning)?;
            let report = report::build_report(
                &ranked,
                &weights,
                state.mapping(),
                settings.report.top,
                chrono::Local::now().naive_local(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
