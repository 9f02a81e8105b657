pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kpca-portal-api")]
#[command(about = "KPCA portal API - role-gated back-office service")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Mint a signed development token")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        Some(Commands::Token(args)) => commands::token::handle(args, output_format),
        None => commands::serve::handle(commands::serve::ServeArgs::default()).await,
    }
}
