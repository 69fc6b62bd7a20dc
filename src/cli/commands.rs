use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "zabatda", about = "Find catalog products that look like an image")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed catalog images and upsert them into the store
    Ingest {
        /// Product metadata JSON (array of id, name, brand, price, category, product_url, image_filename)
        #[arg(long, default_value = "data/product_metadata.json")]
        catalog: PathBuf,
        /// Directory holding the product images
        #[arg(long, default_value = "data/product_images")]
        images: PathBuf,
        /// Delete every stored product first
        #[arg(long)]
        clear: bool,
        /// Validate and embed without writing to the store
        #[arg(long)]
        dry_run: bool,
        /// Embed one image at a time instead of in batches
        #[arg(long, conflicts_with = "batch_size")]
        sequential: bool,
        /// Images per embedding call (defaults to ZABATDA_BATCH_SIZE or 32)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Search the catalog with an image
    Search {
        image: PathBuf,
        #[arg(long, default_value = "5")]
        limit: usize,
        #[arg(long, default_value = "0.0")]
        min_similarity: f64,
        /// Only rank products in this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one stored product
    Get { id: String },
    /// Show store and model statistics
    Stats,
    /// Delete every stored product
    Clear,
}
