use anyhow::Context;
use clap::{Parser, Subcommand};
use jewel_pricing::batch::JsonFileCatalog;
use jewel_pricing::clock::SystemClock;
use jewel_pricing::db::SqliteDb;
use jewel_pricing::pricing::format::{format_indian, format_inr};
use jewel_pricing::pricing::Karat;
use jewel_pricing::providers::gold_price::karat_rates;
use jewel_pricing::providers::FixedQuoteSource;
use jewel_pricing::services::ExportService;
use jewel_pricing::settings::Settings;
use jewel_pricing::state::AppState;
use std::path::PathBuf;
use std::sync::Arc;

/// Dynamic jewelry pricing engine
#[derive(Parser, Debug)]
#[command(name = "jewel-pricing", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pricing API with the daily gold refresh
    Serve,

    /// Price a catalog JSON file and write a CSV price sheet
    Export {
        /// JSON array of {handle, title, description, descriptionHtml}
        #[arg(long)]
        products: PathBuf,

        /// Directory for the CSV file
        #[arg(long, default_value = "exports")]
        out: PathBuf,

        /// Use this 24K price instead of fetching one
        #[arg(long)]
        spot: Option<f64>,
    },

    /// Price a single product description
    Quote {
        /// File holding the description text or HTML
        #[arg(long)]
        description: PathBuf,

        /// Purity to price (10K, 14K, 18K); all offered purities if omitted
        #[arg(long)]
        karat: Option<String>,

        /// Use this 24K price instead of fetching one
        #[arg(long)]
        spot: Option<f64>,
    },

    /// Show the current gold price and per-karat rates
    GoldPrice {
        /// Fetch from the quote source even if today's price is cached
        #[arg(long)]
        refresh: bool,
    },
}

fn build_state(settings: Settings, spot: Option<f64>) -> anyhow::Result<AppState> {
    let state = match spot {
        Some(price) => {
            let sqlite = Arc::new(SqliteDb::new(&settings.database_path)?);
            let source = Arc::new(FixedQuoteSource::new(price)?);
            AppState::with_parts(settings, sqlite, source, Arc::new(SystemClock))
        }
        None => AppState::new(settings)?,
    };
    Ok(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env().context("Failed to load settings")?;
    jewel_pricing::init_tracing();

    match cli.command {
        Commands::Serve => {
            let state = Arc::new(build_state(settings, None)?);
            jewel_pricing::serve(state).await?;
        }
        Commands::Export { products, out, spot } => {
            let state = build_state(settings, spot)?;
            let catalog = JsonFileCatalog::new(&products);
            let result = ExportService::export_catalog(&state, &catalog, &out).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Quote {
            description,
            karat,
            spot,
        } => {
            let state = build_state(settings, spot)?;
            let text = std::fs::read_to_string(&description)
                .with_context(|| format!("Cannot read {}", description.display()))?;

            match karat {
                Some(label) => {
                    let karat: Karat = label.parse()?;
                    let breakdown = state
                        .pricing
                        .quote(&text, karat.label())
                        .await
                        .with_context(|| format!("No quote for karat {}", label))?;
                    println!("{}", serde_json::to_string_pretty(&breakdown)?);
                    eprintln!("{} total: {}", karat, format_inr(breakdown.total));
                }
                None => {
                    let result = state.pricing.quote_all_karats(&text).await?;
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
            }
        }
        Commands::GoldPrice { refresh } => {
            let state = build_state(settings, None)?;
            let spot = if refresh {
                state.gold.force_refresh().await?
            } else {
                state.gold.get_gold_price().await
            };
            let report = serde_json::json!({
                "spot": spot,
                "karatRates": karat_rates(spot.price_24k),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            eprintln!("24K: ₹{}/g", format_indian(spot.price_24k, true));
        }
    }

    Ok(())
}
