pub mod command;
pub mod render;
pub mod runner;

pub use command::Command;
pub use runner::{Flow, Session};
