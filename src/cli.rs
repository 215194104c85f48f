use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "sorry-checkr",
    about = "Find sorry placeholders in Lean projects and open tracking issues",
    version
)]
pub struct Cli {
    /// Sub-directory within the repository to scan
    #[arg(default_value = ".")]
    pub search_path: PathBuf,

    /// Path to the root of the target git repository
    #[arg(long, value_name = "PATH")]
    pub repo_path: PathBuf,

    /// Walk the tree and list obligations without calling the analysis service or creating issues
    #[arg(long)]
    pub dry_run: bool,

    /// Print the dry-run listing as JSON
    #[arg(long)]
    pub json: bool,

    /// Issue label [default: "proof wanted", or the config value]
    #[arg(long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Gemini model used for analysis [default: "gemini-2.5-pro", or the config value]
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// URL to a webpage used as extra context (repeatable)
    #[arg(long = "reference-url", value_name = "URL")]
    pub reference_url: Vec<String>,

    /// Search the web for imports that cannot be resolved on disk
    #[arg(long)]
    pub web_search: bool,

    /// Config file [default: <repo>/.sorry-checkr/config.toml, fallback ~/.config/sorry-checkr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only print the final summary line
    #[arg(short, long)]
    pub quiet: bool,
}
