// SPDX-License-Identifier: MIT

use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

/// Writes `contents` verbatim into a temporary input file.
pub fn sample_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp sample file");
    file.write_all(contents.as_bytes())
        .expect("write temp sample file");
    file.flush().expect("flush temp sample file");
    file
}

/// Writes `samples` one per line into a temporary input file.
pub fn write_samples(samples: &[i64]) -> NamedTempFile {
    let contents: String =
        samples.iter().map(|value| format!("{value}\n")).collect();
    sample_file(&contents)
}

/// Seeded sequence of `len` values in `[-bound, bound]`; the same seed
/// always yields the same samples.
pub fn pseudo_random_samples(len: usize, seed: u64, bound: i64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-bound..=bound)).collect()
}

/// Straight-line wrapping sum used as the expected value in tests.
pub fn reference_sum(samples: &[i64]) -> i64 {
    samples.iter().fold(0i64, |acc, &x| acc.wrapping_add(x))
}

/// Straight-line extrema used as the expected value in tests.
pub fn reference_extrema(samples: &[i64]) -> Option<(i64, i64)> {
    let min = samples.iter().copied().min()?;
    let max = samples.iter().copied().max()?;
    Some((min, max))
}
