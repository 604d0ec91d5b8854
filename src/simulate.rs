//! Paired-end short read simulation through ART.
//!
//! Each call writes a single-record FASTA into its own temporary directory,
//! runs `art_illumina` on it and reads the two mate files back. The
//! directory (with ART's `.aln` side files) is removed when the call returns,
//! whether it succeeded or not.

use crate::error::HarnessError;
use crate::runner::{ToolCommand, ToolRunner};
use crate::seqio::{read_fastq, write_fasta, FastaRecord, FastqRecord};
use anyhow::{Context, Result};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const TOOL: &str = "ART";

/// Sequencing technology settings passed to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortReadProfile {
    /// ART `--seqSys` code
    pub platform: &'static str,
    pub read_length: u32,
    pub mean_fragment_length: u32,
    pub fragment_length_sd: u32,
}

impl ShortReadProfile {
    /// 125 bp paired-end reads from 400 ± 60 bp fragments, HiSeq 2500 error model.
    pub const HISEQ_2500: ShortReadProfile = ShortReadProfile {
        platform: "HS25",
        read_length: 125,
        mean_fragment_length: 400,
        fragment_length_sd: 60,
    };
}

/// Both mates of one simulated fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    pub mate1: FastqRecord,
    pub mate2: FastqRecord,
}

/// Produces read pairs for a single sequence at a given coverage depth.
pub trait ReadSimulator {
    fn simulate(&mut self, name: &str, seq: &[u8], depth: f64) -> Result<Vec<ReadPair>>;
}

/// `ReadSimulator` backed by the `art_illumina` executable.
pub struct ArtSimulator<R: ToolRunner> {
    runner: R,
    program: OsString,
    profile: ShortReadProfile,
    work_dir: PathBuf,
}

impl<R: ToolRunner> ArtSimulator<R> {
    /// Temporary files are created inside `work_dir`.
    pub fn new(runner: R, program: impl Into<OsString>, work_dir: impl Into<PathBuf>) -> Self {
        ArtSimulator {
            runner,
            program: program.into(),
            profile: ShortReadProfile::HISEQ_2500,
            work_dir: work_dir.into(),
        }
    }

    fn command(&self, input: &Path, depth: f64, out_prefix: &Path) -> ToolCommand {
        let p = &self.profile;
        ToolCommand::new(TOOL, &self.program)
            .arg("--seqSys")
            .arg(p.platform)
            .arg("--in")
            .path_arg(input)
            .arg("--len")
            .arg(p.read_length.to_string())
            .arg("--mflen")
            .arg(p.mean_fragment_length.to_string())
            .arg("--sdev")
            .arg(p.fragment_length_sd.to_string())
            .arg("--fcov")
            .arg(depth.to_string())
            .arg("--out")
            .path_arg(out_prefix)
    }
}

/// ART names its mate files `<prefix>1.fq` and `<prefix>2.fq`.
pub(crate) fn mate_path(prefix: &Path, mate: u8) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(format!("{mate}.fq"));
    PathBuf::from(s)
}

fn read_mate(path: &Path) -> Result<Vec<FastqRecord>, HarnessError> {
    read_fastq(path).map_err(|e| HarnessError::tool(TOOL, format!("{e:#}")))
}

/// Zip two mate files into pairs; record counts must agree.
pub fn pair_mates(mate1: Vec<FastqRecord>, mate2: Vec<FastqRecord>) -> Result<Vec<ReadPair>, HarnessError> {
    if mate1.len() != mate2.len() {
        return Err(HarnessError::tool(
            TOOL,
            format!(
                "mate files hold different record counts ({} vs {})",
                mate1.len(),
                mate2.len()
            ),
        ));
    }
    Ok(mate1
        .into_iter()
        .zip(mate2)
        .map(|(mate1, mate2)| ReadPair { mate1, mate2 })
        .collect())
}

impl<R: ToolRunner> ReadSimulator for ArtSimulator<R> {
    fn simulate(&mut self, name: &str, seq: &[u8], depth: f64) -> Result<Vec<ReadPair>> {
        let tmp = tempfile::Builder::new()
            .prefix("asmcompare_rotation")
            .tempdir_in(&self.work_dir)
            .with_context(|| format!("Failed to create temporary directory in {}", self.work_dir.display()))?;

        let input = tmp.path().join("rotation.fasta");
        write_fasta(&[FastaRecord { header: name, seq }], &input, 0)?;

        let prefix = tmp.path().join("art_output");
        let cmd = self.command(&input, depth, &prefix);
        let output = self.runner.run(&cmd)?;

        let (fq1, fq2) = (mate_path(&prefix, 1), mate_path(&prefix, 2));
        if !fq1.is_file() || !fq2.is_file() {
            return Err(HarnessError::tool(
                TOOL,
                format!("Could not find ART output read files\n{output}"),
            )
            .into());
        }
        let pairs = pair_mates(read_mate(&fq1)?, read_mate(&fq2)?)?;
        debug!("{name}: {} read pairs at {depth}x", pairs.len());
        Ok(pairs)
    }
}
