pub mod embed;
pub mod imaging;
pub mod ingest;
pub mod rank;
pub mod search;
pub mod stats;
