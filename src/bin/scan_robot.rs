use clap::{Parser, Subcommand};
use grocery_scan::client::browse::{categories, filter_products, lowest_price, CategoryFilter};
use grocery_scan::client::orchestrator::{LogKind, OrchestratorConfig};
use grocery_scan::client::{BackendClient, BackendConfig, Cart, ScanOrchestrator, ScanState};
use grocery_scan::core::catalog::FileCatalogSource;
use grocery_scan::core::{Catalog, CatalogSource};
use grocery_scan::utils::logger;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "scan-robot")]
#[command(about = "Terminal client for the grocery-scan backend")]
struct Args {
    /// Backend base URL
    #[arg(long, default_value = grocery_scan::client::backend::DEFAULT_BASE_URL)]
    base_url: String,

    /// Timeout for the status probe, in seconds
    #[arg(long, default_value = "5")]
    timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe /api/status
    Status,
    /// Run a full scan cycle with progress output
    Scan {
        /// Skip the scripted pauses
        #[arg(long)]
        fast: bool,
    },
    /// Filter products from a catalog file, or from a live scan
    Browse {
        /// Catalog JSON file; a live scan is used when omitted
        #[arg(long)]
        catalog: Option<String>,

        #[arg(short, long, default_value = "")]
        query: String,

        /// Category name, or "all"
        #[arg(long)]
        category: Option<String>,

        /// Add every listed product to a cart and print the total
        #[arg(long)]
        add: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let backend = BackendClient::new(BackendConfig {
        base_url: args.base_url.clone(),
        status_timeout: Duration::from_secs(args.timeout_secs.max(1)),
        ..BackendConfig::default()
    })?;

    match args.command {
        Command::Status => match backend.status().await {
            Ok(report) => {
                let port = report.port.map_or("?".to_string(), |p| p.to_string());
                match report.uptime {
                    Some(uptime) => {
                        println!("✅ {} (port {}, uptime {:.1}s)", report.status, port, uptime)
                    }
                    None => println!("✅ {} (port {})", report.status, port),
                }
            }
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(2);
            }
        },
        Command::Scan { fast } => {
            let config = if fast {
                OrchestratorConfig::instant()
            } else {
                OrchestratorConfig::default()
            };
            let mut orchestrator = ScanOrchestrator::new(backend, config);
            let mut fresh: Option<Catalog> = None;
            let state = orchestrator.start_scan(|catalog| fresh = Some(catalog)).await?;

            for entry in orchestrator.logs() {
                let marker = if entry.kind == LogKind::Info { '>' } else { '#' };
                println!("[{}] {} {}", entry.time, marker, entry.message);
            }

            if state == ScanState::Error {
                eprintln!("Scan failed; run the command again to retry.");
                std::process::exit(2);
            }
            if let Some(catalog) = fresh {
                print_catalog_summary(&catalog);
            }
        }
        Command::Browse {
            catalog,
            query,
            category,
            add,
        } => {
            let catalog = match catalog {
                Some(path) => FileCatalogSource::new(path).read_catalog().await?,
                None => backend.scan().await?,
            };
            let filter = CategoryFilter::from(category.as_deref());
            browse(&catalog, &query, &filter, add);
        }
    }

    Ok(())
}

fn print_catalog_summary(catalog: &Catalog) {
    println!();
    println!(
        "📋 {} products across {} markets (updated {})",
        catalog.products().len(),
        catalog.markets().len(),
        catalog.last_updated.as_deref().unwrap_or("-")
    );
}

fn browse(catalog: &Catalog, query: &str, filter: &CategoryFilter, add: bool) {
    let names: Vec<String> = categories(catalog).iter().map(|c| c.to_string()).collect();
    println!("Categories: {}", names.join(", "));
    println!();

    let products = filter_products(catalog, query, filter);
    let mut cart = Cart::new();

    for product in &products {
        match lowest_price(product.prices()) {
            Some(best) => {
                let market = catalog
                    .market(&best.market_id)
                    .map(|m| m.name.as_str())
                    .unwrap_or(best.market_id.as_str());
                println!(
                    "{} {:<30} {:<12} {:>8.2} ₺  @ {}",
                    product.icon, product.name, product.category, best.price, market
                );
            }
            None => println!("{} {:<30} {:<12}      n/a", product.icon, product.name, product.category),
        }

        if add {
            if let Err(e) = cart.add(product) {
                tracing::warn!("{}", e);
            }
        }
    }

    println!();
    println!("{} of {} products shown", products.len(), catalog.products().len());
    if add {
        println!("🛒 {} cart lines, total {:.2} ₺", cart.len(), cart.total());
    }
}
