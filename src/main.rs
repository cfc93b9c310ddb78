use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use orderpay::application::engine::LifecycleEngine;
use orderpay::config::{EngineConfig, PricingConfig, UrgencyPolicy};
use orderpay::domain::ports::{OrderStoreBox, PaymentStoreBox};
use orderpay::infrastructure::in_memory::{InMemoryOrderStore, InMemoryPaymentStore};
use orderpay::interfaces::csv::command_reader::CommandReader;
use orderpay::interfaces::csv::report_writer::ReportWriter;
use orderpay::interfaces::csv::script::ScriptRunner;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
enum Report {
    Orders,
    Payments,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Lifecycle command script (CSV)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JSON file overriding the default tariff
    #[arg(long)]
    pricing: Option<PathBuf>,

    /// Reject unknown urgency values instead of pricing them as normal
    #[arg(long)]
    strict_urgency: bool,

    /// Recompute the amount when an edit changes pages or urgency
    #[arg(long)]
    reprice_on_edit: bool,

    /// Which entities to print once the script has run
    #[arg(long, value_enum, default_value_t = Report::Orders)]
    report: Report,
}

fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .compact()
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(OrderStoreBox, PaymentStoreBox)> {
    use orderpay::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        let orders: OrderStoreBox = Box::new(store.clone());
        let payments: PaymentStoreBox = Box::new(store);
        return Ok((orders, payments));
    }
    let orders: OrderStoreBox = Box::new(InMemoryOrderStore::new());
    let payments: PaymentStoreBox = Box::new(InMemoryPaymentStore::new());
    Ok((orders, payments))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(OrderStoreBox, PaymentStoreBox)> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    let orders: OrderStoreBox = Box::new(InMemoryOrderStore::new());
    let payments: PaymentStoreBox = Box::new(InMemoryPaymentStore::new());
    Ok((orders, payments))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let pricing = match &cli.pricing {
        Some(path) => PricingConfig::from_json_file(path).into_diagnostic()?,
        None => PricingConfig::default(),
    };
    let config = EngineConfig {
        pricing,
        urgency_policy: if cli.strict_urgency {
            UrgencyPolicy::Strict
        } else {
            UrgencyPolicy::Lenient
        },
        reprice_on_edit: cli.reprice_on_edit,
    };

    let (order_store, payment_store) = open_stores(cli.db_path)?;
    let mut runner = ScriptRunner::new(LifecycleEngine::with_config(
        order_store,
        payment_store,
        config,
    ));

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (line, command) in reader.commands().enumerate() {
        match command {
            Ok(command) => {
                if let Err(e) = runner.apply(command).await {
                    eprintln!("Error processing command {}: {}", line + 1, e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command {}: {}", line + 1, e);
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.report {
        Report::Orders => {
            let rows = runner.order_rows().await.into_diagnostic()?;
            writer.write_orders(rows).into_diagnostic()?;
        }
        Report::Payments => {
            let rows = runner.payment_rows().await.into_diagnostic()?;
            writer.write_payments(rows).into_diagnostic()?;
        }
    }

    Ok(())
}
