//! vixview - Volatility Token Pair Resolver
//!
//! Run with: cargo run -- <POOL_ADDRESS> [--side high|low] [--wallet 0x...]
//!
//! Resolves a VIX pool into one view:
//! - On-chain: getVixData + getRealPoolAddress + vixTokensPrice
//! - Off-chain: market data for the real pool (name, symbol, icons, 24h stats)

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod chain;
mod config;
mod controller;
mod error;
mod market_data;
mod resolver;
mod session;
mod types;
mod units;

#[cfg(test)]
mod test_support;

use alloy_primitives::Address;
use chain::RpcChainReader;
use config::Config;
use controller::{PoolViewController, RequestOutcome, ViewState};
use market_data::GeckoTerminalClient;
use resolver::PoolViewResolver;
use session::{NetworkContext, WalletSession};
use types::{ExplorerLinks, PoolId, PriceSelector, TokenPairView};

#[derive(Parser, Debug)]
#[command(name = "vixview", version, about = "Resolve a volatility token pair view")]
struct Cli {
    /// Pool (proxy) address
    pool: String,

    /// Which token price to show
    #[arg(long, value_enum, default_value_t = PriceSelector::High)]
    side: PriceSelector,

    /// Connected wallet address (repeatable, overrides WALLET_ADDRESSES)
    #[arg(long = "wallet")]
    wallets: Vec<String>,

    /// Emit the view as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Load configuration from a TOML file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to a TOML file and continue
    #[arg(long)]
    save_config: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    #[serde(flatten)]
    view: &'a TokenPairView,
    links: ExplorerLinks,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 📈 VIXVIEW - Volatility Token Pair Resolver").cyan().bold()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn loading_spinner(pool: PoolId) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Resolving pool {}...", pool));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn print_view(view: &TokenPairView, config: &Config) {
    let change = if view.change_24h > 0.0 {
        style(format!("▲ {:.2}%", view.change_24h.abs())).green()
    } else {
        style(format!("▼ {:.2}%", view.change_24h.abs())).red()
    };

    println!();
    println!(
        "{} {}",
        style(&view.name).bold(),
        style(format!("[{}]", view.selector.label())).dim()
    );
    println!("   {}", style(&view.symbol).dim());
    println!();
    println!(
        "   Price:       {}  {}",
        style(view.price.display(config.display_decimals)).bold(),
        change
    );
    println!("   High:        {}", view.high_price.display(config.display_decimals));
    println!("   Low:         {}", view.low_price.display(config.display_decimals));
    println!(
        "   Exact:       {} {}",
        view.price.decimal(),
        style(format!("(raw {})", view.price.raw())).dim()
    );
    println!("   Market Cap:  {}", view.market_cap);
    println!("   Average IV:  {}", view.average_iv);
    println!("   Volume:      {}", view.volume);
    println!();
    println!("   Icons:       {}", view.icon0);
    if let Some(icon1) = &view.icon1 {
        println!("                {}", icon1);
    }
    println!("   Real pool:   {}", view.real_pool_address.to_checksum(None));

    let links = view.explorer_links(&config.explorer_url);
    println!();
    println!("{}", style("Links").bold());
    println!("   {} {}", style("HIGH TOKEN").green(), links.high_token);
    println!("   {} {}", style("LOW TOKEN ").red(), links.low_token);
    println!();
}

fn connected_wallets(cli: &Cli, config: &Config) -> Result<Vec<WalletSession>> {
    if cli.wallets.is_empty() {
        return Ok(config.wallet_sessions());
    }

    cli.wallets
        .iter()
        .map(|w| {
            let address = Address::from_str(w.trim())
                .map_err(|e| eyre!("Invalid --wallet {:?}: {}", w, e))?;
            Ok(WalletSession {
                address,
                chain_id: config.chain_id,
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vixview=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file");
        return Err(e);
    }

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        info!("💾 Configuration written to {}", path.display());
    }

    let pool: PoolId = cli.pool.parse()?;

    if !cli.json {
        print_banner();
        config.print_summary();
    }

    let chain = Arc::new(RpcChainReader::connect(
        &config.rpc_url,
        config.vix_contract_address,
    )?);
    info!("🔗 Pair data contract: {}", chain.vix_contract());
    let market = Arc::new(GeckoTerminalClient::new(
        &config.market_data_url,
        &config.network,
        config.request_timeout(),
    )?);
    let resolver = Arc::new(PoolViewResolver::new(market, config.request_timeout()));
    let controller = PoolViewController::new(resolver);

    let network = connected_wallets(&cli, &config)?
        .into_iter()
        .fold(NetworkContext::new(chain), NetworkContext::with_wallet);
    if let Some(wallet) = network.primary_wallet() {
        info!(
            "👛 Wallet {} on chain {} ({} connected)",
            wallet.address,
            wallet.chain_id,
            network.wallets().len()
        );
    }

    let spinner = if cli.json {
        None
    } else {
        Some(loading_spinner(pool)?)
    };

    if let RequestOutcome::Started(task) = controller.request(pool, cli.side, network) {
        debug!("Resolution generation {} started", controller.generation());
        task.await
            .map_err(|e| eyre!("Resolution task for {} did not complete: {}", pool, e))?;
    }
    let state = controller.settled().await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if let Some(view) = state.view() {
        if cli.json {
            let output = JsonOutput {
                links: view.explorer_links(&config.explorer_url),
                view,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_view(view, &config);
        }
        return Ok(());
    }

    match state {
        ViewState::AwaitingWallet { pool } => {
            warn!("No wallet connected, pool {} left unresolved", pool);
            Err(eyre!(
                "No wallet connected: pass --wallet or set WALLET_ADDRESSES"
            ))
        }
        ViewState::Failed {
            pool,
            selector,
            error,
        } => Err(color_eyre::eyre::Report::new(error)
            .wrap_err(format!("Failed to resolve pool {} ({})", pool, selector))),
        other => Err(eyre!("Resolution ended in unexpected state {:?}", other)),
    }
}
