//! Website-specific scraper configurations

pub mod myntra;
