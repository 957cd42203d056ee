// Bench-local naive construction-stream generator.
//
// The crate under benchmark treats deriving `.head`/`.len`/`.ssam`/`.esam`/
// `.spos` from raw text as an out-of-scope external producer (see
// `SPEC_FULL.md` §1), so there is no in-crate "build an eBWT from a string"
// entry point to call here. This mirrors `tests/testutil`'s brute-force
// rotation sort rather than importing it, since bench and test binaries are
// separate compilation targets; it is kept deliberately small (quadratic in
// text length) and only fed with the modest sizes these benches use.
use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use eri_index::{BuildInput, RIndex, SampleMode};

pub struct Streams {
    pub heads: Vec<u8>,
    pub lens: Vec<u64>,
    pub samples_first: Vec<usize>,
    pub samples_last: Vec<usize>,
    pub string_offsets: Vec<usize>,
}

fn char_at(text: &[u8], pos: usize) -> u8 {
    text[pos % text.len()]
}

fn cmp_rotations(text: &[u8], a: usize, b: usize) -> Ordering {
    let n = text.len();
    for k in 0..n {
        match char_at(text, a + k).cmp(&char_at(text, b + k)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.cmp(&b)
}

/// Random text over a small alphabet, treated as a single circular string.
pub fn random_text(len: usize, alphabet: u8, seed: u64) -> Vec<u8> {
    let mut rng: StdRng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| b'a' + (rng.gen::<u8>() % alphabet)).collect()
}

/// Computes the run-length eBWT construction streams for a single circular
/// string by brute-force rotation sort.
pub fn naive_streams(text: &[u8]) -> Streams {
    let n = text.len();
    let mut rotations: Vec<usize> = (0..n).collect();
    rotations.sort_by(|&a, &b| cmp_rotations(text, a, b));

    let mut heads = Vec::new();
    let mut lens = Vec::new();
    let mut samples_first = Vec::new();
    let mut samples_last = Vec::new();

    let mut i = 0;
    while i < n {
        let c = char_at(text, rotations[i] + n - 1);
        let run_start = i;
        let mut j = i + 1;
        while j < n && char_at(text, rotations[j] + n - 1) == c {
            j += 1;
        }
        heads.push(c);
        lens.push((j - run_start) as u64);
        samples_first.push(rotations[run_start]);
        samples_last.push(rotations[j - 1]);
        i = j;
    }

    Streams {
        heads,
        lens,
        samples_first,
        samples_last,
        string_offsets: vec![0, n],
    }
}

pub fn build_index(text: &[u8], block_size: usize) -> RIndex {
    let streams = naive_streams(text);
    RIndex::build(BuildInput {
        heads: &streams.heads,
        lens: &streams.lens,
        samples_first: &streams.samples_first,
        samples_last: &streams.samples_last,
        string_offsets: &streams.string_offsets,
        block_size,
        sample_mode: SampleMode::Default,
    })
    .expect("naive streams over a single string always sample sufficiently")
}

/// `count` random patterns of length `pattern_len` drawn from the same
/// alphabet as `text`, so most of them have at least one match.
pub fn random_patterns(count: usize, pattern_len: usize, alphabet: u8, seed: u64) -> Vec<Vec<u8>> {
    let mut rng: StdRng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..pattern_len).map(|_| b'a' + (rng.gen::<u8>() % alphabet)).collect())
        .collect()
}
