pub mod cli;
pub mod config;
pub mod image;
pub mod model_loader;
