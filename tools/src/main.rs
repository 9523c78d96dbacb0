//! poi-runner: headless runner for the POI analytics layer.
//!
//! Usage:
//!   poi-runner --db poi.db load --csv "Bigbox Stores Metrics.csv"
//!   poi-runner --db poi.db summary --chain-name Walmart
//!   poi-runner --db poi.db chains --sort avg_sales_per_visitor --top 8

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use poi_analytics_core::{
    export,
    loader,
    store::VenueStore,
    synthetic,
    ChainSortKey, EngineConfig, FilterField, FilterParams, QueryEngine, SearchField, VenueFilter,
    VenueSet, VenueSource,
};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(name = "poi-runner")]
#[command(version, about = "Query and aggregate retail venue (POI) data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database holding the loaded venues
    #[arg(long, global = true, env = "POI_DB", default_value = "poi_database.db")]
    db: String,

    /// JSON engine configuration (page sizes, search fields, state field)
    #[arg(long, global = true, env = "POI_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a venue CSV into the database
    Load {
        #[arg(long)]
        csv: PathBuf,

        /// Append instead of replacing the existing rows
        #[arg(long)]
        append: bool,
    },
    /// Write a deterministic synthetic dataset as a loadable CSV
    Generate {
        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(long, default_value = "1000")]
        count: usize,

        #[arg(short, long)]
        out: PathBuf,
    },
    #[command(flatten)]
    Query(QueryCommand),
}

/// Commands answered from the loaded dataset.
#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// Page through matching venues
    Venues {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value = "1")]
        page: usize,

        /// Defaults to the configured page size
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Summary statistics over matching venues
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Per-chain performance breakdown
    Chains {
        #[command(flatten)]
        filter: FilterArgs,

        /// total_foot_traffic | total_sales | avg_sales_per_visitor | total_venues
        #[arg(long)]
        sort: Option<String>,

        /// Keep only the first N rows
        #[arg(long)]
        top: Option<usize>,
    },
    /// Per-DMA venue distribution
    Dmas {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        top: Option<usize>,
    },
    /// Distinct values for a filter picker (chains, dmas, categories, cities, states)
    Values { field: String },
    /// Autocomplete suggestions
    Suggest {
        query: String,

        /// Restrict to one field (name, chain, city, address, state, state_code)
        #[arg(long)]
        field: Option<String>,
    },
    /// Export matching venues as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long, value_enum, default_value_t = Layout::Report)]
        layout: Layout,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long)]
    chain_name: Option<String>,
    #[arg(long)]
    dma: Option<String>,
    #[arg(long)]
    sub_category: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state_code: Option<String>,
    #[arg(long)]
    is_open: Option<String>,
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    fn into_filter(self) -> Result<VenueFilter> {
        let params = FilterParams {
            chain_name: self.chain_name,
            dma: self.dma,
            sub_category: self.sub_category,
            city: self.city,
            state_code: self.state_code,
            is_open: self.is_open,
            search: self.search,
        };
        Ok(VenueFilter::try_from(params)?)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Layout {
    Report,
    Source,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(&path.to_string_lossy())?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Load { csv, append } => {
            let store = VenueStore::open(&cli.db)?;
            let inserted = loader::load_csv_into_store(&csv, &store, !append)
                .with_context(|| format!("loading {}", csv.display()))?;
            print_json(&serde_json::json!({ "inserted": inserted, "db": cli.db }))?;
        }
        Commands::Generate { seed, count, out } => {
            let venues = synthetic::generate_venues(seed, count);
            let rows: Vec<_> = venues.iter().collect();
            let file = File::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            let written = export::write_source_csv(file, &rows)?;
            log::info!("Wrote {written} synthetic venues to {}", out.display());
        }
        Commands::Query(command) => {
            let engine = open_engine(&cli.db, config)?;
            run_query(&engine, command)?;
        }
    }
    Ok(())
}

/// Read the whole dataset once. A missing or unreadable database stops here,
/// before any query is answered.
fn open_engine(db: &str, config: EngineConfig) -> Result<QueryEngine<VenueSet>> {
    let store = VenueStore::open(db)?;
    let set = VenueSet::from_store(&store)
        .with_context(|| format!("reading venues from {db}; run `load` first"))?;
    if set.is_empty() {
        log::warn!("Database {db} holds no venues");
    }
    Ok(QueryEngine::new(set, config))
}

fn run_query<S: VenueSource>(engine: &QueryEngine<S>, command: QueryCommand) -> Result<()> {
    match command {
        QueryCommand::Venues { filter, page, page_size } => {
            let page_size = page_size.unwrap_or(engine.config().default_page_size);
            let result = engine.query_venues(&filter.into_filter()?, page, page_size)?;
            print_json(&result)?;
        }
        QueryCommand::Summary { filter } => {
            print_json(&engine.summary(&filter.into_filter()?))?;
        }
        QueryCommand::Chains { filter, sort, top } => {
            let sort_key = sort.as_deref().map(str::parse::<ChainSortKey>).transpose()?;
            let mut rows = engine.chain_performance(Some(&filter.into_filter()?), sort_key);
            if let Some(n) = top {
                rows.truncate(n);
            }
            print_json(&serde_json::json!({ "chain_performance": rows }))?;
        }
        QueryCommand::Dmas { filter, top } => {
            let mut rows = engine.dma_distribution(Some(&filter.into_filter()?));
            if let Some(n) = top {
                rows.truncate(n);
            }
            print_json(&serde_json::json!({ "dma_distribution": rows }))?;
        }
        QueryCommand::Values { field } => {
            let field: FilterField = field.parse()?;
            match field {
                FilterField::Dma => print_json(&serde_json::json!({ "dmas": engine.distinct_dmas() }))?,
                other => print_json(&serde_json::json!({ "values": engine.distinct_values(other) }))?,
            }
        }
        QueryCommand::Suggest { query, field } => {
            let field = field.as_deref().map(str::parse::<SearchField>).transpose()?;
            print_json(&serde_json::json!({ "suggestions": engine.autocomplete(&query, field) }))?;
        }
        QueryCommand::Export { filter, out, layout } => {
            let rows = engine.matching(&filter.into_filter()?);
            let file = File::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            let written = match layout {
                Layout::Report => export::write_report_csv(file, &rows)?,
                Layout::Source => export::write_source_csv(file, &rows)?,
            };
            log::info!("Exported {written} venues to {}", out.display());
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_commands_parse_alongside_load_and_generate() {
        let cli = Cli::try_parse_from(["poi-runner", "--db", "t.db", "load", "--csv", "v.csv"]).unwrap();
        assert!(matches!(cli.command, Commands::Load { append: false, .. }));

        let cli = Cli::try_parse_from(["poi-runner", "generate", "--out", "g.csv"]).unwrap();
        assert!(matches!(cli.command, Commands::Generate { seed: 42, count: 1000, .. }));

        let cli = Cli::try_parse_from([
            "poi-runner", "chains", "--chain-name", "Walmart", "--sort", "total_sales", "--top", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Query(QueryCommand::Chains { filter, sort, top }) => {
                assert_eq!(filter.chain_name.as_deref(), Some("Walmart"));
                assert_eq!(sort.as_deref(), Some("total_sales"));
                assert_eq!(top, Some(3));
            }
            other => panic!("expected chains, got {other:?}"),
        }
    }
}
