//! Long-format comparison table: one row per (assembler, long read depth) run.

use crate::error::HarnessError;
use anyhow::{Context, Result};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const TABLE_FILE: &str = "quast_results.tsv";

/// Columns of the comparison table. The first three come from the harness,
/// the rest from QUAST's transposed report.
pub const HEADER: [&str; 49] = [
    "Assembler",
    "Long read depth",
    "Run time (seconds)",
    "# contigs (>= 0 bp)",
    "# contigs (>= 1000 bp)",
    "# contigs (>= 5000 bp)",
    "# contigs (>= 10000 bp)",
    "# contigs (>= 25000 bp)",
    "# contigs (>= 50000 bp)",
    "Total length (>= 0 bp)",
    "Total length (>= 1000 bp)",
    "Total length (>= 5000 bp)",
    "Total length (>= 10000 bp)",
    "Total length (>= 25000 bp)",
    "Total length (>= 50000 bp)",
    "# contigs",
    "Largest contig",
    "Total length",
    "Reference length",
    "GC (%)",
    "Reference GC (%)",
    "N50",
    "NG50",
    "N75",
    "NG75",
    "L50",
    "LG50",
    "L75",
    "LG75",
    "# misassemblies",
    "# misassembled contigs",
    "Misassembled contigs length",
    "# local misassemblies",
    "# unaligned contigs",
    "Unaligned length",
    "Genome fraction (%)",
    "Duplication ratio",
    "# N's per 100 kbp",
    "# mismatches per 100 kbp",
    "# indels per 100 kbp",
    "Largest alignment",
    "NA50",
    "NGA50",
    "NA75",
    "NGA75",
    "LA50",
    "LGA50",
    "LA75",
    "LGA75",
];

const LEADING_COLUMNS: usize = 3;

/// Number of QUAST metric fields a row is expected to carry.
pub const METRIC_COLUMNS: usize = HEADER.len() - LEADING_COLUMNS;

/// Depths are printed with at least one decimal (`0.0`, `2.5`).
pub fn format_depth(depth: f64) -> String {
    format!("{depth:?}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub assembler: String,
    pub long_read_depth: f64,
    pub run_time_seconds: f64,
    pub metrics: Vec<String>,
}

impl ComparisonRow {
    fn to_line(&self) -> String {
        let mut fields = vec![
            self.assembler.clone(),
            format_depth(self.long_read_depth),
            self.run_time_seconds.to_string(),
        ];
        fields.extend(self.metrics.iter().cloned());
        fields.join("\t")
    }
}

/// Append-only handle on the table file.
#[derive(Debug, Clone)]
pub struct ComparisonTable {
    path: PathBuf,
}

impl ComparisonTable {
    /// Open the table at `path`, writing the header first if the file is new.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            let mut f = File::create(&path)
                .with_context(|| format!("Failed to create results table {}", path.display()))?;
            writeln!(f, "{}", HEADER.join("\t"))?;
        }
        Ok(ComparisonTable { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, row: &ComparisonRow) -> Result<()> {
        if row.metrics.len() != METRIC_COLUMNS {
            warn!(
                "{} row has {} metric columns, table expects {}",
                row.assembler,
                row.metrics.len(),
                METRIC_COLUMNS
            );
        }
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open results table {}", self.path.display()))?;
        writeln!(f, "{}", row.to_line())?;
        Ok(())
    }
}

/// Metric values from a QUAST `transposed_report.tsv`.
///
/// The header line is skipped; of the second line the first field (the run
/// label) is dropped and the rest returned.
pub fn read_transposed_report(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path).with_context(|| format!("Failed to open QUAST report {}", path.display()))?;
    let mut lines = BufReader::new(f).lines();
    let _header = lines.next().transpose()?;
    match lines.next().transpose()? {
        Some(line) => Ok(line
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .skip(1)
            .map(str::to_string)
            .collect()),
        None => Err(HarnessError::tool(
            "QUAST",
            format!("report {} has no metrics line", path.display()),
        )
        .into()),
    }
}
