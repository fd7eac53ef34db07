//! Command-line player and checker for Skein stories.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "skein",
    about = "Skein: parse, check and play branching stories",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log more (repeat for debug and trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a story file
    Check {
        /// Story source file
        file: PathBuf,
    },

    /// Play a story interactively on the terminal
    Play {
        /// Story source file
        file: PathBuf,

        /// Print the whole play-through when the story ends
        #[arg(short, long)]
        transcript: bool,
    },

    /// Advance a saved context to its next pause
    Resume {
        /// Story source file
        file: PathBuf,

        /// Context JSON file; created at the start if missing
        #[arg(short, long, default_value = "context.json")]
        context: PathBuf,

        /// Print the section as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pick an option from a saved context
    Pick {
        /// Story source file
        file: PathBuf,

        /// Index into the visible options, starting at 0
        index: usize,

        /// Context JSON file
        #[arg(short, long)]
        context: PathBuf,

        /// Print the section as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every addressable path of a story
    Paths {
        /// Story source file
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { file } => commands::check::run(&file),
        Commands::Play { file, transcript } => commands::play::run(&file, transcript),
        Commands::Resume {
            file,
            context,
            json,
        } => commands::resume::run(&file, &context, json),
        Commands::Pick {
            file,
            index,
            context,
            json,
        } => commands::pick::run(&file, index, &context, json),
        Commands::Paths { file } => commands::paths::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
