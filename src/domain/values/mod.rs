pub mod embedding;
pub mod search_params;
pub mod similarity;
