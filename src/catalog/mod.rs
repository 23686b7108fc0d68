pub mod client;
pub mod models;

pub use client::{CatalogClient, CatalogSource, parse_search_response};
pub use models::{SearchQuery, Track};
