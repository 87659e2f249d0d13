//! Rulepad - a terminal editor for payroll mapping rules.
//!
//! # Usage
//!
//! ```bash
//! rulepad emp.rules
//! rulepad --theme light emp.rules
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rulepad::app::App;
use rulepad::config::{self, ThemeMode};

/// A terminal editor for payroll mapping rules
#[derive(Parser, Debug)]
#[command(name = "rulepad", version, about, long_about = None)]
struct Cli {
    /// Rules file to edit
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,
}

fn main() -> Result<()> {
    // Initialize logging; WARN by default so the terminal UI stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let flags = config::load_config_flags(&config::global_config_path())?
        .union(&config::load_config_flags(&config::local_override_path())?);
    let theme = cli.theme.or(flags.theme).unwrap_or(ThemeMode::Blue);

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    App::new(cli.file)
        .with_theme(theme.into())
        .run()
        .context("Application error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_argument_parses() {
        let cli = Cli::try_parse_from(["rulepad", "emp.rules"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("emp.rules"));
        assert_eq!(cli.theme, None);
    }

    #[test]
    fn test_theme_flag_parses() {
        let cli = Cli::try_parse_from(["rulepad", "--theme", "light", "emp.rules"]).unwrap();
        assert_eq!(cli.theme, Some(ThemeMode::Light));
    }

    #[test]
    fn test_missing_file_argument_is_an_error() {
        assert!(Cli::try_parse_from(["rulepad"]).is_err());
    }
}
