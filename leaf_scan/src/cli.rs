use crate::selection::ImageSource;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "leaf_scan",
    about = "Classify potato leaf photos with a remote inference service"
)]
pub struct Cli {
    /// Disable coloured output.
    #[arg(long, global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload one image and print the predicted disease class.
    Analyze(AnalyzeArgs),
    /// Check that the inference service answers.
    Ping,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct AnalyzeArgs {
    /// Image file to upload.
    #[arg(long)]
    pub gallery: Option<PathBuf>,
    /// Use the newest shot in the configured capture directory.
    #[arg(long)]
    pub camera: bool,
}

impl AnalyzeArgs {
    pub fn source(&self) -> ImageSource {
        match &self.gallery {
            Some(path) => ImageSource::Gallery(path.clone()),
            None => ImageSource::Camera,
        }
    }
}
