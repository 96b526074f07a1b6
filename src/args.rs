use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "visual-discovery")]
#[command(about = "Find catalog products that look like an image")]
#[command(version)]
pub struct Cli {
    /// Path to a configuration file (TOML, YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the configuration
    #[arg(long, env = "VISUAL_DISCOVERY_API_URL")]
    pub api_url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an image and list similar products
    Discover {
        /// Local file path or http(s) URL
        image: String,

        /// Minimum similarity in [0, 1]
        #[arg(long)]
        min_score: Option<f64>,

        /// Maximum number of candidates to request
        #[arg(long)]
        limit: Option<usize>,

        /// Save the image as a new catalog product afterwards
        #[arg(long)]
        save: bool,
    },

    /// List products related to a stored product
    Related {
        id: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Manage stored products
    Products {
        #[command(subcommand)]
        action: ProductCommands,
    },
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List every stored product
    List,
    /// Delete stored products by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}
