//! Synthetic Illumina read set: simulate, pool, shuffle, write.
//!
//! Every reference sequence is simulated `rotation_count` times, each time
//! from a fresh random rotation at `1 / rotation_count` of its target depth.
//! All pairs are collected in memory, shuffled together and written as two
//! position-paired FASTQ files.
//!
//! If both FASTQ files already exist nothing is simulated, so an interrupted
//! comparison can be restarted cheaply.

use crate::depth::allocate;
use crate::error::HarnessError;
use crate::rotate::RotationTask;
use crate::seqio::{read_fasta, write_fastq_record};
use crate::simulate::{ReadPair, ReadSimulator};
use anyhow::{Context, Result};
use log::{debug, info};
use rand::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const READS_1: &str = "fake_illumina_1.fastq";
pub const READS_2: &str = "fake_illumina_2.fastq";

/// Validated read simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// One multiplier per reference sequence, in FASTA order
    pub relative_depths: Vec<f64>,
    /// Depth a sequence with relative depth 1.0 receives
    pub base_depth: f64,
    pub rotation_count: usize,
}

/// Locations of the pooled mate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedReads {
    pub reads_1: PathBuf,
    pub reads_2: PathBuf,
}

impl PairedReads {
    pub fn in_dir(dir: &Path) -> Self {
        PairedReads {
            reads_1: dir.join(READS_1),
            reads_2: dir.join(READS_2),
        }
    }

    pub fn exist(&self) -> bool {
        self.reads_1.is_file() && self.reads_2.is_file()
    }
}

/// Read pairs from every simulator call, held until written.
#[derive(Debug, Default)]
pub struct ReadPool {
    pairs: Vec<ReadPair>,
}

impl ReadPool {
    pub fn extend(&mut self, pairs: Vec<ReadPair>) {
        self.pairs.extend(pairs);
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pairs.shuffle(rng);
    }

    /// Write mate 1 of each pair to `path_1` and mate 2 to `path_2`, in pool order.
    ///
    /// Both files are written under a `.tmp` name and renamed only once
    /// complete.
    /// On failure neither `.tmp` file is left behind.
    pub fn write_paired(&self, path_1: &Path, path_2: &Path) -> Result<()> {
        let tmp_1 = tmp_sibling(path_1);
        let tmp_2 = tmp_sibling(path_2);
        let result = self.write_tmp(&tmp_1, &tmp_2).and_then(|()| {
            fs::rename(&tmp_1, path_1).with_context(|| format!("Failed to move reads into {}", path_1.display()))?;
            fs::rename(&tmp_2, path_2).with_context(|| format!("Failed to move reads into {}", path_2.display()))?;
            Ok(())
        });
        if result.is_err() {
            for tmp in [&tmp_1, &tmp_2] {
                if let Err(e) = fs::remove_file(tmp) {
                    debug!("Could not remove {}: {e}", tmp.display());
                }
            }
        }
        result
    }

    fn write_tmp(&self, tmp_1: &Path, tmp_2: &Path) -> Result<()> {
        let mut w1 = create(tmp_1)?;
        let mut w2 = create(tmp_2)?;
        for pair in &self.pairs {
            write_fastq_record(&mut w1, &pair.mate1)?;
            write_fastq_record(&mut w2, &pair.mate2)?;
        }
        w1.flush()?;
        w2.flush()?;
        Ok(())
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".tmp");
    PathBuf::from(s)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(f))
}

/// Produce (or reuse) the pooled paired-end read files in `out_dir`.
pub fn generate_reads<S, R>(
    reference: &Path,
    settings: &SimulationSettings,
    simulator: &mut S,
    rng: &mut R,
    out_dir: &Path,
) -> Result<PairedReads>
where
    S: ReadSimulator + ?Sized,
    R: Rng + ?Sized,
{
    let reads = PairedReads::in_dir(out_dir);
    if reads.exist() {
        info!("Synthetic Illumina reads already present, skipping simulation");
        return Ok(reads);
    }
    info!("Generating synthetic Illumina reads");

    let contigs = read_fasta(reference)?;
    let depths = allocate(
        &settings.relative_depths,
        contigs.len(),
        settings.base_depth,
        settings.rotation_count,
    )?;
    if let Some(c) = contigs.iter().find(|c| c.seq.is_empty()) {
        return Err(HarnessError::config(format!("reference sequence {} is empty", c.name)).into());
    }

    let mut pool = ReadPool::default();
    for (contig, depth) in contigs.iter().zip(&depths) {
        debug!("Loaded {}", contig.header);
        info!(
            "{}: {} bp at {}x total, {} rotations of {}x",
            contig.name,
            contig.seq.len(),
            depth.total,
            settings.rotation_count,
            depth.per_rotation
        );
        for _ in 0..settings.rotation_count {
            let task = RotationTask::draw(contig, depth.per_rotation, rng)?;
            debug!("{} rotated by {}", task.name, task.offset);
            pool.extend(simulator.simulate(task.name, &task.rotated, task.depth)?);
        }
    }

    pool.shuffle(rng);
    pool.write_paired(&reads.reads_1, &reads.reads_2)?;
    info!("Wrote {} read pairs to {} and {}", pool.pair_count(), reads.reads_1.display(), reads.reads_2.display());
    Ok(reads)
}
