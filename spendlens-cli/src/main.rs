use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use spendlens_core::{Category, Direction};
use spendlens_finance::{
    Period, RunStatus, SortKey, StatementReport, TransactionQuery, analyze_pdf, spending_trends,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod output;

#[derive(Parser, Debug)]
#[command(
    name = "spendlens",
    version,
    about = "Spending analysis for GPay and bank PDF statements"
)]
struct Cli {
    /// Config file (default: ~/.spendlens/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, categorize and summarize a PDF statement
    Analyze(AnalyzeArgs),

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Statement PDF
    pdf: PathBuf,

    /// Password for an encrypted PDF
    #[arg(long)]
    password: Option<String>,

    /// Keep per-page samples and print diagnostics
    #[arg(long)]
    debug: bool,

    /// Print one JSON document instead of tables
    #[arg(long)]
    json: bool,

    /// Write the (filtered) transactions to a CSV file
    #[arg(long, value_name = "OUT")]
    csv: Option<PathBuf>,

    /// Only debit or credit transactions
    #[arg(long = "type", value_name = "debit|credit")]
    direction: Option<Direction>,

    /// Only these categories (repeatable)
    #[arg(long)]
    category: Vec<Category>,

    /// Transaction order: date, amount or description
    #[arg(long, default_value = "date")]
    sort: SortKey,

    /// Spending trend by period: daily, weekly or monthly
    #[arg(long)]
    trends: Option<Period>,

    /// Number of top merchants (overrides config)
    #[arg(long)]
    top: Option<usize>,

    /// Limit number of transactions printed
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config as TOML
    Show,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze(args) => analyze(cli.config, args)?,
        Command::Config { command } => match command {
            ConfigCommand::Init { force } => config::init_config(cli.config.as_deref(), force)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(cli.config.as_deref())?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn analyze(config_path: Option<PathBuf>, args: AnalyzeArgs) -> Result<()> {
    let mut cfg = config::load_config(config_path.as_deref())?;
    cfg.debug |= args.debug;
    if let Some(top) = args.top {
        cfg.top_merchants_limit = top.max(1);
    }

    let bytes = std::fs::read(&args.pdf).with_context(|| format!("read {}", args.pdf.display()))?;
    info!(path = %args.pdf.display(), bytes = bytes.len(), "loaded statement");
    let report = analyze_pdf(&bytes, args.password.as_deref(), &cfg)
        .with_context(|| format!("analyze {}", args.pdf.display()))?;

    let query = TransactionQuery {
        direction: args.direction,
        categories: args.category.clone(),
        sort: args.sort,
    };
    let rows = query.apply(&report.transactions);
    let trends = args.trends.map(|p| spending_trends(&report.transactions, p));

    if let Some(out) = &args.csv {
        output::export_csv(out, &rows)?;
        info!(path = %out.display(), rows = rows.len(), "wrote csv");
    }

    if args.json {
        let view = output::JsonView::new(&report, rows, trends.as_deref(), cfg.debug);
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_report(&report, &rows, trends.as_deref(), &args, cfg.debug);
    Ok(())
}

fn print_report(
    report: &StatementReport,
    rows: &[&spendlens_core::Transaction],
    trends: Option<&[spendlens_finance::TrendPoint]>,
    args: &AnalyzeArgs,
    debug: bool,
) {
    if debug {
        println!("## Diagnostics\n{}\n", output::diagnostics_table(&report.diagnostics));
    }
    if report.status == RunStatus::NoTransactionsFound {
        print!("{}", output::troubleshooting(&report.diagnostics));
        return;
    }

    let a = &report.analysis;
    println!("## Summary\n{}\n", output::summary_table(a));
    println!("## Spending by category\n{}\n", output::category_table(a));
    println!("## Monthly spending\n{}\n", output::monthly_table(a));
    println!("## Top merchants\n{}\n", output::merchant_table(a));
    if let (Some(points), Some(period)) = (trends, args.trends) {
        println!("## Trends ({period})\n{}\n", output::trend_table(points));
    }

    let shown: Vec<_> = rows.iter().take(args.limit).copied().collect();
    println!(
        "## Transactions ({} of {})\n{}",
        shown.len(),
        rows.len(),
        output::transaction_table(&shown)
    );
}
