pub mod histogram;
pub mod http;
