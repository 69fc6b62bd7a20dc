pub mod ingest_item;
pub mod product;
pub mod search_hit;
