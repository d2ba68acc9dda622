//! CLI module for the public library backend
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: apply database migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Public library - lending backend for books, users and loans
#[derive(Parser)]
#[command(name = "public-library")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,

    /// Apply PostgreSQL migrations and exit
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["public-library", "serve"]).unwrap();
        assert_eq!(cli.command, Some(Command::Serve));

        let cli = Cli::try_parse_from(["public-library", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Command::Migrate));

        let cli = Cli::try_parse_from(["public-library"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["public-library", "ui"]).is_err());
    }
}
