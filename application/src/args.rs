//! [`Args`] definitions.

use clap::{Parser, Subcommand};

/// Server of the staff directory.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// [`Command`] to run.
    ///
    /// [`Command::Serve`] if not specified.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Command of the application.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Subcommand)]
pub enum Command {
    /// Apply database migrations and serve the API.
    #[default]
    Serve,

    /// Apply database migrations and exit.
    Migrate,

    /// Apply database migrations and fill the database with sample users.
    Seed,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::{Args, Command};

    #[test]
    fn serves_by_default() {
        let args = Args::try_parse_from(["app"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert_eq!(args.command.unwrap_or_default(), Command::Serve);
    }

    #[test]
    fn parses_subcommand() {
        let args =
            Args::try_parse_from(["app", "--config", "prod.toml", "seed"])
                .unwrap();

        assert_eq!(args.config, "prod.toml");
        assert_eq!(args.command, Some(Command::Seed));
    }
}
