//! The comparison run: reads, assemblies, QUAST, table rows.
//!
//! Each step is skipped when its output is already on disk, so rerunning the
//! same command after a failure picks up where the last run stopped. Any
//! error aborts the whole run.

use crate::assemble::{Assembler, Quast};
use crate::pool::{generate_reads, SimulationSettings};
use crate::runner::ToolRunner;
use crate::simulate::ArtSimulator;
use crate::stage::StageOutcome;
use crate::table::{ComparisonRow, ComparisonTable, TABLE_FILE};
use anyhow::{Context, Result};
use log::info;
use rand::Rng;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// Long read depth recorded for assemblers that only saw short reads.
pub const SHORT_ONLY_DEPTH: f64 = 0.0;

/// Executables for each collaborator.
#[derive(Debug, Clone)]
pub struct Programs {
    pub art: OsString,
    pub unicycler: OsString,
    pub spades: OsString,
    pub quast: OsString,
}

impl Default for Programs {
    fn default() -> Self {
        Programs {
            art: "art_illumina".into(),
            unicycler: "unicycler".into(),
            spades: "spades.py".into(),
            quast: "quast.py".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    pub reference: PathBuf,
    pub simulation: SimulationSettings,
    /// Reads, assemblies, reports and the table all live here
    pub out_dir: PathBuf,
    pub programs: Programs,
}

/// Run every stage in order and return the rows appended by this run.
pub fn run_comparison<R, G>(config: &ComparisonConfig, runner: &mut R, rng: &mut G) -> Result<Vec<ComparisonRow>>
where
    R: ToolRunner + ?Sized,
    G: Rng + ?Sized,
{
    let out_dir = &config.out_dir;
    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let reads = {
        let mut simulator = ArtSimulator::new(&mut *runner, config.programs.art.clone(), out_dir.clone());
        generate_reads(&config.reference, &config.simulation, &mut simulator, rng, out_dir)?
    };

    let table = ComparisonTable::create(out_dir.join(TABLE_FILE))?;
    let quast = Quast::new(config.programs.quast.clone(), out_dir);
    let assemblers = [
        Assembler::unicycler_short_only(config.programs.unicycler.clone(), out_dir),
        Assembler::spades_short_only(config.programs.spades.clone(), out_dir),
    ];

    let mut rows = Vec::new();
    for assembler in &assemblers {
        let run_time_seconds = match assembler.run(runner, &reads)? {
            StageOutcome::Skipped => continue,
            StageOutcome::Succeeded { elapsed_seconds } => elapsed_seconds,
        };
        let label = Quast::run_label(assembler.name(), SHORT_ONLY_DEPTH);
        let metrics = quast.assess(runner, &assembler.assembly(), &config.reference, &label)?;
        let row = ComparisonRow {
            assembler: assembler.name().to_string(),
            long_read_depth: SHORT_ONLY_DEPTH,
            run_time_seconds,
            metrics,
        };
        table.append(&row)?;
        info!("{label}: {run_time_seconds:.1} s, added to {}", table.path().display());
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::pool::PairedReads;
    use crate::table::HEADER;
    use crate::testutil::FakeRunner;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_reference(dir: &Path) -> PathBuf {
        let path = dir.join("reference.fasta");
        let chrom: String = "ACGGTCA".chars().cycle().take(1000).collect();
        let plasmid: String = "TTAGC".chars().cycle().take(2000).collect();
        fs::write(&path, format!(">chromosome\n{chrom}\n>plasmid circular\n{plasmid}\n")).unwrap();
        path
    }

    fn config(dir: &Path, depths: &[f64]) -> ComparisonConfig {
        ComparisonConfig {
            reference: write_reference(dir),
            simulation: SimulationSettings {
                relative_depths: depths.to_vec(),
                base_depth: 10.0,
                rotation_count: 10,
            },
            out_dir: dir.join("out"),
            programs: Programs::default(),
        }
    }

    fn table_lines(cfg: &ComparisonConfig) -> Vec<String> {
        fs::read_to_string(cfg.out_dir.join(TABLE_FILE))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn full_run_then_resume() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), &[1.0, 2.0]);
        let mut runner = FakeRunner::default();
        let mut rng = StdRng::seed_from_u64(17);

        let rows = run_comparison(&cfg, &mut runner, &mut rng).unwrap();

        assert_eq!(runner.count("ART"), 20);
        let fcov: Vec<String> = runner
            .calls
            .iter()
            .filter(|c| c.tool == "ART")
            .map(|c| c.value_of("--fcov").unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(fcov[..10].iter().all(|d| d == "1"));
        assert!(fcov[10..].iter().all(|d| d == "2"));
        assert_eq!(runner.count("Unicycler"), 1);
        assert_eq!(runner.count("SPAdes"), 1);
        assert_eq!(runner.count("QUAST"), 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].assembler, "Unicycler");
        assert_eq!(rows[1].assembler, "SPAdes");
        let lines = table_lines(&cfg);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Unicycler\t0.0\t"));
        assert!(lines[2].starts_with("SPAdes\t0.0\t"));
        assert_eq!(lines[2].split('\t').count(), HEADER.len());

        // everything is on disk now, so a rerun does nothing
        let calls_before = runner.calls.len();
        let rows = run_comparison(&cfg, &mut runner, &mut rng).unwrap();
        assert!(rows.is_empty());
        assert_eq!(runner.calls.len(), calls_before);
        assert_eq!(table_lines(&cfg).len(), 3);
        assert!(PairedReads::in_dir(&cfg.out_dir).exist());
    }

    #[test]
    fn rerunning_one_assembler_adds_one_row() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), &[1.0, 2.0]);
        let mut runner = FakeRunner::default();
        let mut rng = StdRng::seed_from_u64(3);
        run_comparison(&cfg, &mut runner, &mut rng).unwrap();

        fs::remove_dir_all(cfg.out_dir.join("quast_results/SPAdes 0.0x")).unwrap();
        fs::remove_file(cfg.out_dir.join("spades_short_only/scaffolds.fasta")).unwrap();
        let mut runner = FakeRunner::default();
        let rows = run_comparison(&cfg, &mut runner, &mut rng).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(runner.count("ART"), 0);
        assert_eq!(runner.count("Unicycler"), 0);
        assert_eq!(runner.count("SPAdes"), 1);
        assert_eq!(runner.count("QUAST"), 1);
        assert_eq!(table_lines(&cfg).len(), 4);
    }

    #[test]
    fn depth_mismatch_runs_no_tools() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), &[1.0]);
        let mut runner = FakeRunner::default();
        let mut rng = StdRng::seed_from_u64(0);

        let err = run_comparison(&cfg, &mut runner, &mut rng).unwrap_err();
        assert!(matches!(err.downcast_ref::<HarnessError>(), Some(HarnessError::Config(_))));
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn assembler_failure_stops_the_run() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), &[1.0, 2.0]);
        let mut runner = FakeRunner { fail_tool: Some("Unicycler".into()), ..FakeRunner::default() };
        let mut rng = StdRng::seed_from_u64(0);

        let err = run_comparison(&cfg, &mut runner, &mut rng).unwrap_err();
        assert!(err.to_string().contains("Unicycler encountered an error"));
        assert_eq!(runner.count("SPAdes"), 0);
        assert_eq!(runner.count("QUAST"), 0);
        assert_eq!(table_lines(&cfg).len(), 1);
    }

    #[test]
    fn quast_failure_stops_the_run() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path(), &[1.0, 2.0]);
        let mut runner = FakeRunner { fail_tool: Some("QUAST".into()), ..FakeRunner::default() };
        let mut rng = StdRng::seed_from_u64(0);

        assert!(run_comparison(&cfg, &mut runner, &mut rng).is_err());
        assert_eq!(runner.count("Unicycler"), 1);
        assert_eq!(runner.count("SPAdes"), 0);
        assert_eq!(table_lines(&cfg).len(), 1);
    }
}
