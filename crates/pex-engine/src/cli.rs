//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Runs a particle emitter headless and reports what it produced.
#[derive(Debug, Parser)]
#[command(name = "pex-sim", version, about)]
pub struct Cli {
    /// Emitter description (TOML)
    pub config: PathBuf,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Seed for the variance sampler
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Override the source position
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub source: Option<Vec<f32>>,

    /// Write the final vertex buffer as JSON
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); ignored when RUST_LOG is set
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter directive for the requested verbosity.
    #[must_use]
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "pex=info",
            1 => "pex=debug",
            _ => "pex=trace",
        }
    }

    /// Log filter to install: a non-empty `RUST_LOG` wins over `-v`.
    #[must_use]
    pub fn log_filter(&self, rust_log: Option<&str>) -> String {
        match rust_log.map(str::trim) {
            Some(env) if !env.is_empty() => env.to_string(),
            _ => self.log_directive().to_string(),
        }
    }
}
