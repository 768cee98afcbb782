use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hostmapper")]
#[command(
    about = "Convert a browser bookmark export into domain reference tables with network enrichment"
)]
#[command(version)]
pub struct Cli {
    /// Bookmark export HTML file (Netscape bookmark format)
    #[arg(value_name = "BOOKMARKS_FILE", required_unless_present = "init")]
    pub input: Option<PathBuf>,

    /// Create default configuration file at ./config/hostmapper.toml
    #[arg(long)]
    pub init: bool,

    /// Directory where the output CSV tables are written
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum number of domains to enrich (overrides config)
    #[arg(short = 'n', long, value_name = "N")]
    pub top_domains: Option<usize>,

    /// Delay between enriched domains in milliseconds (overrides config)
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Skip network enrichment; only the bookmark and domain count tables
    /// are written
    #[arg(long)]
    pub skip_enrichment: bool,

    /// Verbose logging (use -v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
