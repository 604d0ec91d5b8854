//! Stand-ins for the external collaborators, used by unit tests.

use crate::error::HarnessError;
use crate::runner::{ToolCommand, ToolRunner};
use crate::seqio::read_fasta;
use crate::simulate::mate_path;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const QUAST_METRIC_COUNT: usize = crate::table::METRIC_COLUMNS;

/// Records every command and fakes the files each collaborator would leave behind.
#[derive(Debug, Default)]
pub struct FakeRunner {
    pub calls: Vec<ToolCommand>,
    /// Tool name that should exit non-zero
    pub fail_tool: Option<String>,
    /// Exit zero without writing any output files
    pub skip_outputs: bool,
    /// Read pairs produced per ART call
    pub pairs_per_call: usize,
}

impl FakeRunner {
    pub fn count(&self, tool: &str) -> usize {
        self.calls.iter().filter(|c| c.tool == tool).count()
    }
}

fn path_of(cmd: &ToolCommand, flag: &str) -> PathBuf {
    PathBuf::from(cmd.value_of(flag).unwrap_or_else(|| panic!("{flag} missing from `{cmd}`")))
}

fn write_fake_reads(cmd: &ToolCommand, pairs: usize, call: usize) {
    let contigs = read_fasta(path_of(cmd, "--in")).unwrap();
    let contig = &contigs[0];
    let seq = String::from_utf8_lossy(&contig.seq[..contig.seq.len().min(10)]).into_owned();
    let qual = "I".repeat(seq.len());
    let prefix = path_of(cmd, "--out");
    for mate in [1u8, 2] {
        let mut f = fs::File::create(mate_path(&prefix, mate)).unwrap();
        for i in 0..pairs {
            writeln!(f, "@{}-{}-{}/{}\n{}\n+\n{}", contig.name, call, i, mate, seq, qual).unwrap();
        }
    }
}

fn write_fake_assembly(dir: &Path, file: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(file), ">contig_1\nACGTACGT\n").unwrap();
}

fn write_fake_report(cmd: &ToolCommand) {
    let dir = path_of(cmd, "-o");
    let label = cmd.value_of("-l").unwrap().to_string_lossy().into_owned();
    fs::create_dir_all(&dir).unwrap();
    let header: Vec<String> = (0..QUAST_METRIC_COUNT).map(|i| format!("metric{i}")).collect();
    let values: Vec<String> = (0..QUAST_METRIC_COUNT).map(|i| i.to_string()).collect();
    fs::write(
        dir.join("transposed_report.tsv"),
        format!("Assembly\t{}\n{}\t{}\n", header.join("\t"), label, values.join("\t")),
    )
    .unwrap();
}

impl ToolRunner for FakeRunner {
    fn run(&mut self, cmd: &ToolCommand) -> Result<String, HarnessError> {
        self.calls.push(cmd.clone());
        if self.fail_tool.as_deref() == Some(cmd.tool.as_str()) {
            return Err(HarnessError::tool(&cmd.tool, "simulated failure"));
        }
        if self.skip_outputs {
            return Ok(format!("{}: no output written", cmd.tool));
        }
        match cmd.tool.as_str() {
            "ART" => write_fake_reads(cmd, self.pairs_per_call.max(1), self.calls.len()),
            "Unicycler" => write_fake_assembly(&path_of(cmd, "--out"), "assembly.fasta"),
            "SPAdes" => write_fake_assembly(&path_of(cmd, "-o"), "scaffolds.fasta"),
            "QUAST" => write_fake_report(cmd),
            other => panic!("unexpected tool {other}"),
        }
        Ok(format!("{} finished", cmd.tool))
    }
}
