use crate::error::HarnessError;
use anyhow::{anyhow, Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A single reference sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    /// First token of the header (accession)
    pub name: String,
    /// Full header text without the leading '>'
    pub header: String,
    /// Sequence exactly as written in the file, minus line breaks
    pub seq: Vec<u8>,
}

/// One four-line FASTQ record, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    pub name: String,
    pub seq: String,
    pub spacer: String,
    pub qual: String,
}

fn is_gz(path: &Path) -> bool {
    path.extension().map(|e| e.eq_ignore_ascii_case("gz")).unwrap_or(false)
}

fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, HarnessError> {
    let f = File::open(path).map_err(|source| HarnessError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    if is_gz(path) {
        let gz = MultiGzDecoder::new(f);
        Ok(Box::new(BufReader::new(gz)))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

fn parse_fasta<R: BufRead>(reader: R) -> std::io::Result<Vec<Contig>> {
    let mut contigs: Vec<Contig> = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut current_seq: Vec<u8> = Vec::new();

    for line_res in reader.lines() {
        let line = line_res?;
        let line = line.trim();
        if line.is_empty() { continue; }
        if let Some(header) = line.strip_prefix('>') {
            // flush previous
            if let Some((name, header)) = current.take() {
                contigs.push(Contig { name, header, seq: std::mem::take(&mut current_seq) });
            }
            let header_full = header.trim().to_string();
            let name = header_full.split_whitespace().next().unwrap_or("").to_string();
            current = Some((name, header_full));
        } else if current.is_some() {
            current_seq.extend_from_slice(line.as_bytes());
        }
    }
    if let Some((name, header)) = current.take() {
        contigs.push(Contig { name, header, seq: current_seq });
    }
    Ok(contigs)
}

/// Read every record of a (optionally gzipped) FASTA file, in file order.
///
/// A file without any `>` header yields an empty vector. Sequence characters
/// are not validated or case-folded.
pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<Contig>> {
    let path_ref: &Path = path.as_ref();
    let rdr = open_maybe_gz(path_ref)?;
    let contigs = parse_fasta(rdr).map_err(|source| HarnessError::Input {
        path: path_ref.to_path_buf(),
        source,
    })?;
    Ok(contigs)
}

/// A small record for writing to FASTA
pub struct FastaRecord<'a> {
    pub header: &'a str,
    pub seq: &'a [u8],
}

/// Write records to a FASTA file (wrapped to `line_width` chars; 0 disables wrapping).
pub fn write_fasta<P: AsRef<Path>>(records: &[FastaRecord<'_>], path: P, line_width: usize) -> Result<()> {
    let fh = File::create(&path)
        .with_context(|| format!("Failed to create output FASTA: {}", path.as_ref().display()))?;
    let mut fh = BufWriter::new(fh);
    let lw = if line_width == 0 { usize::MAX } else { line_width };

    for rec in records {
        writeln!(fh, ">{}", rec.header)?;
        let mut start = 0usize;
        while start < rec.seq.len() {
            let end = (start + lw).min(rec.seq.len());
            fh.write_all(&rec.seq[start..end])?;
            writeln!(fh)?;
            start = end;
        }
    }
    fh.flush()?;
    Ok(())
}

/// Read a FASTQ file that follows the strict four-lines-per-record layout.
pub fn read_fastq<P: AsRef<Path>>(path: P) -> Result<Vec<FastqRecord>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("Failed to open FASTQ: {}", path.display()))?;
    let mut lines = BufReader::new(f).lines();
    let mut records = Vec::new();

    while let Some(name) = lines.next() {
        let name = name?;
        if name.is_empty() { continue; }
        if !name.starts_with('@') {
            return Err(anyhow!(
                "FASTQ record {} in {} does not start with '@'",
                records.len() + 1,
                path.display()
            ));
        }
        let mut rest = [String::new(), String::new(), String::new()];
        for slot in rest.iter_mut() {
            *slot = match lines.next() {
                Some(line) => line?,
                None => {
                    return Err(anyhow!(
                        "Truncated FASTQ record {} in {}",
                        records.len() + 1,
                        path.display()
                    ))
                }
            };
        }
        let [seq, spacer, qual] = rest;
        records.push(FastqRecord { name, seq, spacer, qual });
    }
    Ok(records)
}

pub fn write_fastq_record<W: Write>(w: &mut W, rec: &FastqRecord) -> std::io::Result<()> {
    writeln!(w, "{}", rec.name)?;
    writeln!(w, "{}", rec.seq)?;
    writeln!(w, "{}", rec.spacer)?;
    writeln!(w, "{}", rec.qual)
}
