use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "rapjudge",
    version,
    about = "Score a rap verse with a panel of AI judges"
)]
#[command(group(ArgGroup::new("input").args(["file", "text"])))]
pub struct Cli {
    /// Panel config (YAML). Defaults to the built-in panel.
    #[arg(long, env = "RAPJUDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the verse from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Verse text. Without --file or --text, stdin lines are read as transcript segments.
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip all backends and grade from the text alone
    #[arg(long)]
    pub offline: bool,

    /// Save the verse and its grade to the in-process record store
    #[arg(long)]
    pub record: bool,

    /// Per-call timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra attempts on transient backend failures (overrides config)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Print the configured judges and exit
    #[arg(long)]
    pub list_judges: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn file_and_text_conflict() {
        let res = Cli::try_parse_from(["rapjudge", "--file", "a.txt", "--text", "bars"]);
        assert!(res.is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["rapjudge", "--text", "bars"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.offline);
        assert!(cli.timeout.is_none());
    }
}
