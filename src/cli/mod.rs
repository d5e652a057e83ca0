pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Student registry CLI - registration form and admin dashboard")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Registry server selection and health")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Admin login and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Submit, browse, edit, delete and export student records")]
    Student {
        #[command(subcommand)]
        cmd: commands::student::StudentCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Student { cmd } => commands::student::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SortKey;
    use commands::student::StudentCommands;

    #[test]
    fn parses_list_with_filters() {
        let cli = Cli::try_parse_from([
            "registry", "--json", "student", "list", "--class", "10", "--house", "Tagore", "--sort", "class", "--desc",
        ])
        .unwrap();

        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Student {
                cmd: StudentCommands::List { filter, sort, desc },
            } => {
                assert_eq!(filter.class.map(|c| c.level()), Some(10));
                assert_eq!(filter.house, Some(crate::schema::House::Tagore));
                assert_eq!(sort, SortKey::Class);
                assert!(desc);
            }
            _ => panic!("expected student list"),
        }
    }

    #[test]
    fn rejects_unknown_house_filter() {
        assert!(Cli::try_parse_from(["registry", "student", "list", "--house", "Nehru"]).is_err());
        assert!(Cli::try_parse_from(["registry", "student", "list", "--class", "13"]).is_err());
    }

    #[test]
    fn submit_takes_raw_field_text() {
        let cli = Cli::try_parse_from([
            "registry", "student", "submit", "--name", "Asha Rao", "--class", "5", "--section", "A", "--house", "Tagore",
        ])
        .unwrap();

        match cli.command {
            Commands::Student {
                cmd: StudentCommands::Submit { fields },
            } => {
                assert_eq!(fields.name.as_deref(), Some("Asha Rao"));
                assert_eq!(fields.phone, None);
            }
            _ => panic!("expected student submit"),
        }
    }
}
