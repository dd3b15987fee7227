use std::path::PathBuf;

use cubechrono_core::{ScrambleKind, ScrambleRequest};
use eyre::{Context, Result};
use serde::Serialize;

use crate::settings::Settings;

/// Cube Chrono command-line interface
///
/// If no subcommand is specified, then the web server is started.
#[derive(Debug, clap::Parser)]
#[command(version)]
pub(crate) struct Args {
    /// Settings file to load on top of the defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Option<Subcommand>,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Subcommand {
    /// Run the web server.
    Serve {
        /// Port to listen on, overriding the settings.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print scrambles.
    Scramble {
        /// Puzzle to scramble.
        #[arg(short, long, default_value = "Three")]
        kind: ScrambleKind,
        /// Number of scrambles to print.
        #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
        count: i64,
        /// Seed for reproducible scrambles.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the whole batch as JSON instead of one scramble per line.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective settings as JSON.
    Config,
}

impl Default for Subcommand {
    fn default() -> Self {
        Subcommand::Serve { port: None }
    }
}

pub(crate) fn exec(subcommand: Subcommand, mut settings: Settings) -> Result<()> {
    match subcommand {
        Subcommand::Serve { port } => {
            if let Some(port) = port {
                settings.port = port;
            }
            tokio::runtime::Runtime::new()
                .context("error starting async runtime")?
                .block_on(crate::server::serve(settings))
        }

        Subcommand::Scramble {
            kind,
            count,
            seed,
            json,
        } => {
            let request = ScrambleRequest { kind, count, seed };
            let batch = request.generate().context("error generating scrambles")?;
            if json {
                write_json_output(&batch)
            } else {
                for scramble in &batch.scrambles {
                    println!("{scramble}");
                }
                Ok(())
            }
        }

        Subcommand::Config => write_json_output(&settings),
    }
}

fn write_json_output<T: Serialize>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), value)
        .context("error serializing data and writing to stdout")?;
    println!();
    Ok(())
}
