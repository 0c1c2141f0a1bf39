mod app;

pub mod cli;
pub mod client;
pub mod config;
pub mod prediction;
pub mod render;
pub mod selection;
pub mod state;

pub use app::start_app;
