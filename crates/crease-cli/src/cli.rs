use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crease", about = "Ball-by-ball cricket scoring", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the scoring server
    Serve(ServeArgs),
    /// Score a JSON match script and print the scorecard
    Score(ScoreArgs),
    /// Validate a server configuration file
    CheckConfig(CheckConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Match script to replay
    #[arg(short, long)]
    pub file: PathBuf,
    /// Server configuration whose `[engine]` section applies
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CheckConfigArgs {
    #[arg(long)]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_score() {
        let cli = Cli::try_parse_from(["crease", "score", "--file", "final.json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Score(args) => {
                assert_eq!(args.file, PathBuf::from("final.json"));
                assert_eq!(args.format, OutputFormat::Text);
                assert!(args.config.is_none());
            }
            _ => panic!("expected score"),
        }
    }

    #[test]
    fn parse_serve_with_bind() {
        let cli = Cli::try_parse_from([
            "crease",
            "serve",
            "--config",
            "crease.toml",
            "--bind",
            "0.0.0.0:8080",
        ])
        .unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.config, Some(PathBuf::from("crease.toml")));
                assert_eq!(args.bind.map(|a| a.port()), Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn check_config_requires_path() {
        assert!(Cli::try_parse_from(["crease", "check-config"]).is_err());
        let cli = Cli::try_parse_from(["crease", "check-config", "--config", "c.toml"]).unwrap();
        assert!(matches!(cli.command, Command::CheckConfig(_)));
    }

    #[test]
    fn json_format() {
        let cli =
            Cli::try_parse_from(["crease", "score", "-f", "m.json", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Score(ScoreArgs { format: OutputFormat::Json, .. })
        ));
    }
}
