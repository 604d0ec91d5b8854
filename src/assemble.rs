//! Assembler and QUAST stages.

use crate::pool::PairedReads;
use crate::runner::{ToolCommand, ToolRunner};
use crate::stage::{Stage, StageOutcome};
use crate::table::{format_depth, read_transposed_report};
use anyhow::{Context, Result};
use log::info;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavour {
    UnicyclerShortOnly,
    SpadesShortOnly,
}

/// An assembler run on the pooled short reads.
#[derive(Debug, Clone)]
pub struct Assembler {
    name: &'static str,
    program: OsString,
    out_dir: PathBuf,
    assembly_file: &'static str,
    flavour: Flavour,
}

impl Assembler {
    /// Unicycler with `--no_long`; writes `<work_dir>/unicycler_short_only/assembly.fasta`.
    pub fn unicycler_short_only(program: impl Into<OsString>, work_dir: &Path) -> Self {
        Assembler {
            name: "Unicycler",
            program: program.into(),
            out_dir: work_dir.join("unicycler_short_only"),
            assembly_file: "assembly.fasta",
            flavour: Flavour::UnicyclerShortOnly,
        }
    }

    /// Plain SPAdes in `--careful` mode; writes `<work_dir>/spades_short_only/scaffolds.fasta`.
    pub fn spades_short_only(program: impl Into<OsString>, work_dir: &Path) -> Self {
        Assembler {
            name: "SPAdes",
            program: program.into(),
            out_dir: work_dir.join("spades_short_only"),
            assembly_file: "scaffolds.fasta",
            flavour: Flavour::SpadesShortOnly,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn assembly(&self) -> PathBuf {
        self.out_dir.join(self.assembly_file)
    }

    fn command(&self, reads: &PairedReads) -> ToolCommand {
        let cmd = ToolCommand::new(self.name, &self.program);
        match self.flavour {
            Flavour::UnicyclerShortOnly => cmd
                .arg("--short1")
                .path_arg(&reads.reads_1)
                .arg("--short2")
                .path_arg(&reads.reads_2)
                .arg("--no_long")
                .arg("--out")
                .path_arg(&self.out_dir)
                .arg("--keep_temp")
                .arg("0"),
            Flavour::SpadesShortOnly => cmd
                .arg("-1")
                .path_arg(&reads.reads_1)
                .arg("-2")
                .path_arg(&reads.reads_2)
                .arg("--careful")
                .arg("-o")
                .path_arg(&self.out_dir),
        }
    }

    /// Assemble `reads` unless the assembly is already on disk.
    pub fn run<R: ToolRunner + ?Sized>(&self, runner: &mut R, reads: &PairedReads) -> Result<StageOutcome> {
        let mut stage = Stage::new(self.name, self.assembly());
        stage.run(|| {
            info!("Running {} with short reads only", self.name);
            fs::create_dir_all(&self.out_dir)
                .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;
            Ok(runner.run(&self.command(reads))?)
        })
    }
}

/// QUAST assessment against the reference.
#[derive(Debug, Clone)]
pub struct Quast {
    program: OsString,
    results_dir: PathBuf,
}

impl Quast {
    /// Reports go to `<work_dir>/quast_results/<run label>/`.
    pub fn new(program: impl Into<OsString>, work_dir: &Path) -> Self {
        Quast {
            program: program.into(),
            results_dir: work_dir.join("quast_results"),
        }
    }

    /// `"<assembler> <depth>x"`, e.g. `SPAdes 0.0x`.
    pub fn run_label(assembler: &str, long_read_depth: f64) -> String {
        format!("{} {}x", assembler, format_depth(long_read_depth))
    }

    fn report_dir(&self, label: &str) -> PathBuf {
        self.results_dir.join(label)
    }

    pub fn report_path(&self, label: &str) -> PathBuf {
        self.report_dir(label).join("transposed_report.tsv")
    }

    fn command(&self, assembly: &Path, reference: &Path, label: &str) -> ToolCommand {
        ToolCommand::new("QUAST", &self.program)
            .path_arg(assembly)
            .arg("-R")
            .path_arg(reference)
            .arg("-o")
            .path_arg(&self.report_dir(label))
            .arg("-l")
            .arg(label)
    }

    /// Run QUAST (unless its report exists) and return the report's metric fields.
    pub fn assess<R: ToolRunner + ?Sized>(
        &self,
        runner: &mut R,
        assembly: &Path,
        reference: &Path,
        label: &str,
    ) -> Result<Vec<String>> {
        info!("Running QUAST for {label}");
        let mut stage = Stage::new("QUAST", self.report_path(label));
        stage.run(|| Ok(runner.run(&self.command(assembly, reference, label))?))?;
        read_transposed_report(stage.artifact())
    }
}
