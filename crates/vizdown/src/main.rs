//! vizdown CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "vizdown")]
#[command(version)]
#[command(about = "Compile dashboard specs into Quarto documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a page spec (or a site of pages) to .qmd files
    Compile {
        /// YAML or JSON file holding one page or `pages: [...]`
        input: PathBuf,

        /// Directory for the generated files (defaults to the input's directory)
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// YAML file with compile options
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the generated documents instead of writing files
        #[arg(long)]
        stdout: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vizdown=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            output_dir,
            config,
            stdout,
        } => commands::compile::execute(commands::compile::CompileArgs {
            input,
            output_dir,
            config,
            stdout,
        }),
    }
}
