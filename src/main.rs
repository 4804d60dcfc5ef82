//! Bankdash CLI
//!
//! Drives the dashboard engine against a live workshop API without a
//! browser:
//! - Watch the page repaint as modules unlock
//! - Render a screen once
//! - Browse spending categories
//! - Run a semantic search

use anyhow::{bail, Context};
use bankdash::{
    generate_default_config, Action, Backend, Config, Dashboard, Feature, HttpBackend,
    LoggingConfig, Tab, TokioScheduler, UnlockStatus, VirtualDom,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bankdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless driver for the banking workshop dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Keep the dashboard running and print the page whenever it changes
    Watch {
        /// Start on the banking screen instead of the startup screen
        #[arg(short, long)]
        banking: bool,
        /// Tab to open (transactions, categories, timeseries, search)
        #[arg(short, long)]
        tab: Option<Tab>,
        /// Print HTML instead of visible text
        #[arg(long)]
        html: bool,
    },

    /// Render one screen and exit
    Render {
        /// Render the banking screen
        #[arg(short, long)]
        banking: bool,
        /// Tab to open; implies --banking
        #[arg(short, long)]
        tab: Option<Tab>,
        /// Print HTML instead of visible text
        #[arg(long)]
        html: bool,
    },

    /// List top spending categories
    Categories {
        /// Also list the top merchants of this category
        #[arg(short, long)]
        select: Option<String>,
    },

    /// Search transactions
    Search {
        /// Free-text query
        query: String,
    },

    /// Generate default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    init_logging(&config.logging);

    tracing::info!("Bankdash v{} against {}", env!("CARGO_PKG_VERSION"), config.api.base_url);

    LocalSet::new().run_until(run(cli.command, config)).await
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bankdash={}", logging.level).into());

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    let backend = Rc::new(HttpBackend::new(&config.api)?);
    let page = Rc::new(VirtualDom::new());
    let dashboard = Dashboard::new(&config, backend.clone(), page.clone(), Rc::new(TokioScheduler));
    let settle_timeout = Duration::from_millis(config.api.request_timeout_ms + 500);

    match command {
        Commands::Watch { banking, tab, html } => {
            dashboard.initialize();
            open(&dashboard, banking, tab);

            let shutdown = tokio::signal::ctrl_c();
            tokio::pin!(shutdown);
            let mut ticker = tokio::time::interval(Duration::from_millis(250));
            let mut last = String::new();

            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = ticker.tick() => {
                        let current = if html { page.html() } else { page.text() };
                        if current != last {
                            println!("[{}] {}", Local::now().format("%H:%M:%S"), current);
                            last = current;
                        }
                    }
                }
            }

            dashboard.shutdown();
            tracing::info!(renders = page.mount_count(), "Watch stopped");
        }

        Commands::Render { banking, tab, html } => {
            bootstrap(&dashboard, &backend).await?;
            open(&dashboard, banking, tab);
            wait_until(settle_timeout, || !busy(&dashboard)).await;

            if html {
                println!("{}", page.html());
            } else {
                println!("{}", page.text());
            }
            dashboard.shutdown();
        }

        Commands::Categories { select } => {
            let status = bootstrap(&dashboard, &backend).await?;
            if !Tab::Categories.is_reachable(&status) {
                bail!(
                    "Spending categories are locked: complete the {} module first",
                    Feature::Categories.module()
                );
            }
            open(&dashboard, true, Some(Tab::Categories));
            let categories = dashboard.categories();
            if !wait_until(settle_timeout, || !categories.is_loading()).await {
                bail!("Timed out waiting for categories");
            }

            let cache = categories.cache();
            let rows = cache.categories.unwrap_or_default();
            if rows.is_empty() {
                println!("No categories found.");
            } else {
                println!("{:<30} {:>12}", "Category", "Total Spent");
                println!("{}", "-".repeat(43));
                for row in &rows {
                    println!("{:<30} {:>12.2}", row.category, row.total_spent);
                }
            }

            if let Some(category) = select {
                dashboard.dispatch(Action::SelectCategory(category.clone()));
                if !wait_until(settle_timeout, || !categories.is_loading()).await {
                    bail!("Timed out waiting for merchants of {}", category);
                }

                println!();
                println!("Top Merchants: {}", category);
                let merchants = categories.cache().merchants.unwrap_or_default();
                if merchants.is_empty() {
                    println!("No merchants found for this category.");
                }
                for m in &merchants {
                    println!("  {:<28} {:>12.2}", m.merchant, m.amount);
                }
            }
            dashboard.shutdown();
        }

        Commands::Search { query } => {
            bootstrap(&dashboard, &backend).await?;
            open(&dashboard, true, Some(Tab::Search));

            let search = dashboard.search();
            if !search.perform(&query) {
                bail!(
                    "Query must be at least {} characters",
                    config.dashboard.min_query_len
                );
            }
            if !wait_until(settle_timeout, || !search.is_loading()).await {
                bail!("Timed out waiting for search results");
            }

            let hits = search.cache().results.unwrap_or_default();
            if hits.is_empty() {
                println!("No results found for \"{}\"", query.trim());
            } else {
                println!(
                    "{:<24} {:<18} {:<20} {:>10} {:>6}",
                    "Merchant", "Category", "Location", "Amount", "Match"
                );
                println!("{}", "-".repeat(82));
                for hit in &hits {
                    println!(
                        "{:<24} {:<18} {:<20} {:>10.2} {:>5}%",
                        hit.merchant,
                        hit.category,
                        hit.location,
                        hit.amount,
                        hit.similarity()
                    );
                }
            }
            if let Some(toast) = page.toasts().last() {
                println!();
                println!("{}", toast.text());
            }
            dashboard.shutdown();
        }

        Commands::InitConfig { output } => {
            let config = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
        }
    }

    Ok(())
}

/// Initialize the dashboard and apply one status fetch right away, so
/// one-shot commands don't wait for the first poll tick.
async fn bootstrap(dashboard: &Dashboard, backend: &HttpBackend) -> anyhow::Result<UnlockStatus> {
    dashboard.initialize();
    let status = backend
        .status()
        .await
        .with_context(|| format!("Cannot reach the workshop API at {}", backend.base_url()))?;
    dashboard.apply_status(status);
    Ok(status)
}

fn open(dashboard: &Dashboard, banking: bool, tab: Option<Tab>) {
    if banking || tab.is_some() {
        dashboard.navigate_to_banking();
    }
    if let Some(tab) = tab {
        dashboard.switch_tab(tab);
    }
}

fn busy(dashboard: &Dashboard) -> bool {
    dashboard.categories().is_loading() || dashboard.search().is_loading()
}

async fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while !done() {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    true
}
