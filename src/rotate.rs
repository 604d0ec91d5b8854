//! Circular rotations of reference sequences.
//!
//! Simulating every batch of reads from the same start coordinate leaves the
//! junction between the last and first base under-covered. Each simulator
//! call therefore gets its own randomly rotated copy of the sequence.

use crate::error::HarnessError;
use crate::seqio::Contig;
use rand::Rng;

/// One simulator call's worth of work: a rotated copy of a sequence and the
/// depth to simulate it at.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationTask<'a> {
    pub name: &'a str,
    pub offset: usize,
    pub rotated: Vec<u8>,
    pub depth: f64,
}

impl<'a> RotationTask<'a> {
    pub fn draw<R: Rng + ?Sized>(contig: &'a Contig, depth: f64, rng: &mut R) -> Result<Self, HarnessError> {
        let (offset, rotated) = random_rotation(&contig.seq, rng)?;
        Ok(RotationTask { name: &contig.name, offset, rotated, depth })
    }
}

/// Return `seq[k..] ++ seq[..k]`. `k` must be below `seq.len()` (or zero).
pub fn rotate(seq: &[u8], k: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    out.extend_from_slice(&seq[k..]);
    out.extend_from_slice(&seq[..k]);
    out
}

/// Rotate `seq` by an offset drawn uniformly from `[0, len)`.
pub fn random_rotation<R: Rng + ?Sized>(seq: &[u8], rng: &mut R) -> Result<(usize, Vec<u8>), HarnessError> {
    if seq.is_empty() {
        return Err(HarnessError::config("cannot rotate an empty sequence"));
    }
    let k = rng.gen_range(0..seq.len());
    Ok((k, rotate(seq, k)))
}
