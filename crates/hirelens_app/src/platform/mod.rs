mod app;
pub mod logging;
mod render;

pub use app::{run, Cli};
