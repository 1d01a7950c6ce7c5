pub mod log;
pub mod scrape;
