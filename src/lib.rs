pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod search;
pub mod session;

pub use app::{Action, AppState, Effect};
pub use catalog::{CatalogClient, CatalogSource, SearchQuery, Track};
pub use config::Config;
pub use error::{AppError, Result};
pub use favorites::{FavoriteEntry, FavoritesStore, Toggled};
pub use search::{Applied, FetchOutcome, SearchController, SearchTicket};
pub use session::Session;
