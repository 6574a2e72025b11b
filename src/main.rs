//! Lending Sentinel - Main Entry Point
//!
//! Queries lending positions and prints their liquidation risk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lending_sentinel::chain::ChainId;
use lending_sentinel::config::Config;
use lending_sentinel::monitor::{MonitorReport, PositionMonitor};
use lending_sentinel::price::{PriceContext, PriceResolver};
use lending_sentinel::protocol::{supported_chains, ProtocolKind};
use lending_sentinel::risk::Severity;
use tracing::{error, info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Lending Sentinel CLI
#[derive(Parser)]
#[command(name = "lending-sentinel")]
#[command(version, about = "Liquidation risk monitoring for Aave V3, Compound V3, Spark and Radiant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a wallet's positions on one or more protocols
    Monitor {
        /// Wallet address (0x-prefixed, 20 bytes)
        #[arg(short, long)]
        wallet: String,

        /// Protocol to query (repeatable: aave_v3, compound_v3, spark, radiant)
        #[arg(short, long = "protocol", required = true)]
        protocols: Vec<ProtocolKind>,

        /// EIP-155 chain id
        #[arg(short, long, default_value = "1")]
        chain: u64,

        /// Dominant collateral symbol for a USD liquidation price (e.g. ETH)
        #[arg(short = 's', long)]
        collateral_symbol: Option<String>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve USD prices for token symbols
    Prices {
        /// Token symbols (e.g. ETH WBTC USDC)
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Chain used as price context
        #[arg(short, long, default_value = "1")]
        chain: u64,
    },

    /// Show which protocols are registered on which chains
    Support,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = Config::load()?;
    config.validate()?;

    match cli.command {
        Commands::Monitor {
            wallet,
            protocols,
            chain,
            collateral_symbol,
            json,
        } => run_monitor(&config, &wallet, &protocols, chain, collateral_symbol.as_deref(), json).await,
        Commands::Prices { symbols, chain } => run_prices(&config, &symbols, chain).await,
        Commands::Support => {
            print_support();
            Ok(())
        }
    }
}

/// Run the monitoring pipeline and print one report per protocol.
async fn run_monitor(
    config: &Config,
    wallet: &str,
    protocols: &[ProtocolKind],
    chain_id: u64,
    collateral_symbol: Option<&str>,
    json: bool,
) -> Result<()> {
    let monitor = PositionMonitor::from_config(config)?;

    let outcomes = monitor
        .monitor_protocols(wallet, protocols, chain_id, collateral_symbol)
        .await?;

    let mut reports = Vec::new();
    for (protocol, outcome) in outcomes {
        match outcome {
            Ok(result) => reports.push(MonitorReport::from_result(&result)),
            Err(e) => error!(protocol = %protocol, error = %e, "❌ Monitoring failed"),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    let alerts = reports.iter().filter(|r| r.alert_threshold_hit).count();
    if alerts > 0 {
        warn!("⚠️ {} of {} positions below alert threshold", alerts, reports.len());
    }
    info!("Monitored {} of {} protocols", reports.len(), protocols.len());

    Ok(())
}

fn print_report(report: &MonitorReport) {
    let marker = match report.severity {
        Severity::Safe => "🟢",
        Severity::Warning => "🟡",
        Severity::Critical => "🔴",
    };

    println!("{} {} on {} ({})", marker, report.protocol, report.chain_name, report.wallet);
    println!("   Health Factor:   {}", report.health_factor);
    println!("   Buffer:          {}%", report.buffer_percent);
    println!("   Collateral:      ${}", report.total_collateral_usd);
    println!("   Debt:            ${}", report.total_debt_usd);
    println!("   Available:       ${}", report.available_borrows_usd);
    println!("   Liq. Threshold:  {}", report.liquidation_threshold);
    println!("   LTV:             {}", report.ltv);
    match report.liquidation_price {
        Some(price) => println!("   Liq. Price:      {:.4}", price),
        None => println!("   Liq. Price:      n/a"),
    }
    println!("   Severity:        {} ({})", report.severity, report.severity.action());
}

/// Resolve and print prices for a list of symbols.
async fn run_prices(config: &Config, symbols: &[String], chain_id: u64) -> Result<()> {
    let chain = ChainId::from_id(chain_id)
        .with_context(|| format!("Unsupported chain id: {}", chain_id))?;
    let resolver = PriceResolver::from_config(config)?;

    let refs: Vec<&str> = symbols.iter().map(String::as_str).collect();
    let quotes = resolver
        .resolve_many(&refs, &PriceContext::on_chain(chain))
        .await;

    for symbol in symbols {
        let key = symbol.trim().to_ascii_uppercase();
        match quotes.get(&key) {
            Some(quote) => println!("{:<8} ${}", quote.symbol, quote.usd),
            None => println!("{:<8} unavailable", key),
        }
    }

    Ok(())
}

/// Print the protocol/chain support matrix.
fn print_support() {
    for protocol in ProtocolKind::ALL {
        let chains: Vec<String> = supported_chains(protocol)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("{:<12} {}", protocol.id(), chains.join(", "));
    }
}

/// Initialize logging to stderr and a daily rolling file.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "lending-sentinel.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the guard alive for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("lending_sentinel=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stderr.and(file_writer))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .init();

    Ok(())
}
