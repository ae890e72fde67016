//! [`Args`] definitions.

use clap::{Parser, Subcommand};

/// Backend of the users management dashboard.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Action to perform, [`Action::Serve`] by default.
    #[command(subcommand)]
    pub action: Option<Action>,
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

/// Action performed by the application.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Subcommand)]
pub enum Action {
    /// Runs the GraphQL server.
    #[default]
    Serve,

    /// Replaces all the stored users with the sample ones, and exits.
    Seed,
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::{Action, Args};

    #[test]
    fn serves_by_default() {
        let args = Args::try_parse_from(["dashboard"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert_eq!(args.action.unwrap_or_default(), Action::Serve);
    }

    #[test]
    fn parses_seed() {
        let args =
            Args::try_parse_from(["dashboard", "-c", "dev.toml", "seed"])
                .unwrap();

        assert_eq!(args.config, "dev.toml");
        assert_eq!(args.action, Some(Action::Seed));
    }
}
