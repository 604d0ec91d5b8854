//! asmcompare: assembler comparison on synthetic reads
//!
//! Simulates paired-end Illumina reads from a reference genome, assembles
//! them with each assembler, scores the assemblies with QUAST and collects
//! the results in `quast_results.tsv`.
//!
//! ### Example
//! ```text
//! asmcompare --reference genome.fasta --relative_depths 1.0,1.5,2.0 --seed 7
//! ```

mod assemble;
mod compare;
mod depth;
mod error;
mod pool;
mod rotate;
mod runner;
mod seqio;
mod simulate;
mod stage;
mod table;
#[cfg(test)]
mod testutil;

use anyhow::{Context, Result};
use clap::Parser;
use compare::{run_comparison, ComparisonConfig, Programs};
use depth::parse_relative_depths;
use error::HarnessError;
use log::info;
use pool::SimulationSettings;
use rand::prelude::*;
use runner::SystemRunner;
use std::ffi::OsString;
use std::path::PathBuf;

/// asmcompare CLI
#[derive(Parser, Debug)]
#[command(name = "asmcompare")]
#[command(author, version, about = "Compare genome assemblers on synthetic reads", long_about = None)]
struct Cli {
    /// The reference genome to shred and reassemble (FASTA, optionally .gz)
    #[arg(long = "reference", value_name = "FASTA")]
    reference: PathBuf,

    /// Comma-delimited list of relative read depths, one per sequence in the reference
    #[arg(long = "relative_depths", value_name = "LIST", default_value = "1.0")]
    relative_depths: String,

    /// Base read depth for the synthetic Illumina reads
    #[arg(long = "illumina_depth", value_name = "FLOAT", default_value_t = 40.0)]
    illumina_depth: f64,

    /// Number of times to run the read simulator with random start positions
    #[arg(long = "rotation_count", value_name = "INT", default_value_t = 100)]
    rotation_count: usize,

    /// Directory for reads, assemblies, QUAST reports and the results table
    #[arg(long = "out_dir", value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Optional RNG seed for reproducible rotations and read order
    #[arg(long = "seed", value_name = "INT")]
    seed: Option<u64>,

    /// ART read simulator executable
    #[arg(long = "art", value_name = "PROGRAM", default_value = "art_illumina")]
    art: OsString,

    /// Unicycler executable
    #[arg(long = "unicycler", value_name = "PROGRAM", default_value = "unicycler")]
    unicycler: OsString,

    /// SPAdes executable
    #[arg(long = "spades", value_name = "PROGRAM", default_value = "spades.py")]
    spades: OsString,

    /// QUAST executable
    #[arg(long = "quast", value_name = "PROGRAM", default_value = "quast.py")]
    quast: OsString,
}

impl Cli {
    /// Check the settings that do not need the reference file.
    fn into_config(self) -> Result<ComparisonConfig, HarnessError> {
        let relative_depths = parse_relative_depths(&self.relative_depths)?;
        if self.rotation_count == 0 {
            return Err(HarnessError::config("--rotation_count must be at least 1"));
        }
        if !(self.illumina_depth.is_finite() && self.illumina_depth > 0.0) {
            return Err(HarnessError::config("--illumina_depth must be a positive number"));
        }
        Ok(ComparisonConfig {
            reference: self.reference,
            simulation: SimulationSettings {
                relative_depths,
                base_depth: self.illumina_depth,
                rotation_count: self.rotation_count,
            },
            out_dir: self.out_dir,
            programs: Programs {
                art: self.art,
                unicycler: self.unicycler,
                spades: self.spades,
                quast: self.quast,
            },
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut rng: StdRng = match cli.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(thread_rng()).context("Failed to initialize RNG")?,
    };
    let config = cli.into_config()?;

    let rows = run_comparison(&config, &mut SystemRunner, &mut rng)?;
    info!("Finished: {} new result rows", rows.len());
    Ok(())
}
