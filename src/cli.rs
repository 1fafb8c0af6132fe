use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Zodiac invoice API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply schema migrations, then serve HTTP until Ctrl-C (default)
    Serve,
    /// Apply schema migrations and exit; non-zero if any step failed
    Migrate,
    /// Print the migration status report as JSON and exit
    Status,
}
