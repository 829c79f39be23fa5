mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefind-cli")]
#[command(about = "Find retail stores near a postal code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a store search, following the session page by page
    Search {
        /// Product to find stores for (e.g. "vacuum cleaner")
        #[arg(long, required_unless_present = "retail_store")]
        product: Option<String>,
        /// Retailer name to search for (e.g. "Target")
        #[arg(long)]
        retail_store: Option<String>,
        /// Postal code the search is centred on
        #[arg(long, alias = "zip-code")]
        postal_code: String,
        /// Stop after this many pages even if more are available
        #[arg(long, default_value_t = 5)]
        max_pages: u32,
        /// Width of each distance ring in metres (defaults to config)
        #[arg(long)]
        base_radius: Option<u32>,
        /// Print each page as JSON instead of one line per store
        #[arg(long)]
        json: bool,
    },
    /// Print the loaded configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = storefind_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            product,
            retail_store,
            postal_code,
            max_pages,
            base_radius,
            json,
        } => {
            let options = search::SearchOptions {
                product,
                retail_store,
                postal_code,
                max_pages,
                base_radius,
                json,
            };
            search::run_search(&config, options).await?;
        }
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}
