pub mod models;
pub mod store;

pub use models::{FavoriteEntry, Toggled};
pub use store::FavoritesStore;
