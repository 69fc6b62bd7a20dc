use clap::Parser;
use log::warn;
use std::process::ExitCode;
use zabatda::application::ingest::IngestOptions;
use zabatda::cli::commands::{Cli, Commands};
use zabatda::config::Config;
use zabatda::domain::values::search_params::SearchParams;
use zabatda::infrastructure::catalog::{load_catalog, missing_images};
use zabatda::Zabatda;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app = match Zabatda::open(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error initializing zabatda: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_command(&app, &config, cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_command(
    app: &Zabatda,
    config: &Config,
    cmd: Commands,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Ingest {
            catalog,
            images,
            clear,
            dry_run,
            sequential,
            batch_size,
        } => {
            let items = load_catalog(&catalog, &images, &config.ingest.image_url_prefix)?;
            let missing = missing_images(&items);
            if !missing.is_empty() {
                if missing.len() == items.len() {
                    return Err(format!("No product images found in {}", images.display()).into());
                }
                warn!("{} product images are missing:", missing.len());
                for id in missing.iter().take(5) {
                    warn!("  - {id}");
                }
                if missing.len() > 5 {
                    warn!("  ... and {} more", missing.len() - 5);
                }
            }

            let options = IngestOptions {
                dry_run,
                clear_first: clear,
                batch_size: if sequential {
                    1
                } else {
                    batch_size.unwrap_or(config.ingest.batch_size)
                },
            };
            let stats = app.ingest(items, &options).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            if !dry_run && stats.inserted > 0 {
                println!("Total products in store: {}", app.count()?);
            }
            if !stats.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Search {
            image,
            limit,
            min_similarity,
            category,
        } => {
            let mut params = SearchParams::new(limit, min_similarity)?;
            if let Some(category) = category {
                params = params.with_category(category);
            }
            let bytes = std::fs::read(&image)?;
            let hits = app.search_image(&bytes, &params).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Get { id } => {
            let record = app.get_product(&id)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "id": record.id,
                    "metadata": record.metadata,
                }))?
            );
        }
        Commands::Stats => {
            let stats = app.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Clear => {
            let removed = app.clear()?;
            println!("Deleted {removed} products");
        }
    }
    Ok(ExitCode::SUCCESS)
}
