pub mod fetcher;
pub mod payload;
