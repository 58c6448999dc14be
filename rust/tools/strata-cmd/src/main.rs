use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "strata-cmd")]
#[command(about = "Command-line utility for Strata file operations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a file and display its footer summary as JSON
    Inspect {
        /// Include per-column chunk details (encodings, statistics)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// File URL or path to inspect
        file_path: String,
    },

    /// Print records of a file as JSON lines
    Head {
        /// Number of records to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Number of records to skip first
        #[arg(long, default_value_t = 0)]
        skip: u64,

        /// Columns to read (can be specified multiple times; defaults to all)
        #[arg(short, long)]
        column: Vec<String>,

        /// File URL or path to read
        file_path: String,
    },

    /// Write the sample student dataset to a new file
    Demo {
        /// Number of records to write
        #[arg(long, default_value_t = 100)]
        rows: usize,

        /// Maximum number of records per row group
        #[arg(long, default_value_t = 16)]
        row_group_size: usize,

        /// Output file URL or path (must not exist)
        file_path: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { verbose, file_path } => commands::inspect::run(verbose, file_path),
        Commands::Head {
            count,
            skip,
            column,
            file_path,
        } => commands::head::run(count, skip, column, file_path),
        Commands::Demo {
            rows,
            row_group_size,
            file_path,
        } => commands::demo::run(rows, row_group_size, file_path),
    }
}
