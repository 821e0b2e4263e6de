//! CLI for qrandom — draw from and inspect the pre-fetched random byte pool.
//!
//! Configuration comes from the environment (`QRYPT_API_URL`,
//! `QRYPT_API_TOKEN`, optional `QRYPT_STORE_SIZE` and
//! `QRYPT_STORE_MIN_THRESHOLD`). Set `RUST_LOG=info` to watch refills.

mod commands;
mod error;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qrandom")]
#[command(about = "qrandom — pre-fetched random bytes from a remote entropy service")]
#[command(version = qrandom_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw bytes from the pool, waiting for the background refill if needed
    Bytes {
        /// Number of bytes to draw
        #[arg(long, short = 'n', default_value = "32")]
        count: usize,

        /// Seconds to wait for the pool to hold enough bytes (0 = take what is there)
        #[arg(long, default_value = "90")]
        wait: u64,

        /// Output format
        #[arg(long, default_value = "hex", value_parser = ["hex", "raw", "uint8"])]
        format: String,
    },

    /// Show resolved configuration and pool counters
    Status {
        /// Seconds to let the pool run before reporting
        #[arg(long, default_value = "0")]
        wait: u64,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Call the entropy service once, bypassing the pool
    Fetch {
        /// Number of bytes to request
        #[arg(long, short = 'n', default_value = "32")]
        count: usize,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Bytes {
            count,
            wait,
            format,
        } => commands::bytes::run(count, wait, &format),
        Commands::Status { wait, json } => commands::status::run(wait, json),
        Commands::Fetch { count } => commands::fetch::run(count),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
