pub mod controller;

pub use controller::{Applied, FetchOutcome, SearchController, SearchTicket, run_fetch};
