pub mod state;

pub use state::{Action, AppState, Effect, Outcome};
