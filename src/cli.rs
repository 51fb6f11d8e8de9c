use clap::ValueHint;

use std::path::PathBuf;

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Path to the config file.
    ///
    /// By default, fclite looks for a file named `fclite.toml` in the following directories
    /// (in order):
    ///
    /// - `./` (the current directory)
    /// - `/etc`
    #[arg(
        short,
        long,
        env = "FCLITE_CONFIG",
        value_hint(ValueHint::FilePath)
    )]
    pub config_path: Option<PathBuf>,

    /// Address the host page is served on.
    #[arg(long, env = "FCLITE_BIND_ADDR")]
    pub bind_addr: Option<String>,

    /// Path to the database file backing the feed cache.
    #[arg(long, env = "FCLITE_DB", value_hint(ValueHint::FilePath))]
    pub db_path: Option<PathBuf>,

    /// Base URL of the feed endpoint (`all.json` is appended to it).
    #[arg(long, env = "FCLITE_API_URL", value_hint(ValueHint::Url))]
    pub api_url: Option<String>,
}

impl Args {
    pub fn parse() -> Self {
        clap::Parser::parse()
    }
}
