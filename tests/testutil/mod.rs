use std::cmp::Ordering;

use eri_index::{BuildInput, RIndex, SampleMode};

/// Brute-force construction of the run-length eBWT construction streams for
/// a small multiset of strings, standing in for the prefix-free-parse
/// pipeline that builds them in practice. Quadratic in total text length;
/// only meant for the small inputs these tests use.
pub struct NaiveStreams {
    pub heads: Vec<u8>,
    pub lens: Vec<u64>,
    pub samples_first: Vec<usize>,
    pub samples_last: Vec<usize>,
    pub string_offsets: Vec<usize>,
    pub n: usize,
}

fn char_at(strings: &[Vec<u8>], string_id: usize, pos: usize) -> u8 {
    let s = &strings[string_id];
    s[pos % s.len()]
}

fn cmp_rotations(
    strings: &[Vec<u8>],
    a: (usize, usize),
    b: (usize, usize),
    bound: usize,
) -> Ordering {
    for k in 0..bound {
        let ca = char_at(strings, a.0, a.1 + k);
        let cb = char_at(strings, b.0, b.1 + k);
        match ca.cmp(&cb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.cmp(&b)
}

/// Computes the run-length eBWT of the circular rotations of `strings`
/// (each string treated as one cyclic conjugate class) by brute-force
/// sorting all rotations.
pub fn naive_streams(strings: &[Vec<u8>]) -> NaiveStreams {
    assert!(strings.iter().all(|s| !s.is_empty()));

    let mut string_starts = Vec::with_capacity(strings.len() + 1);
    let mut acc = 0usize;
    for s in strings {
        string_starts.push(acc);
        acc += s.len();
    }
    let n = acc;
    let mut string_offsets = string_starts.clone();
    string_offsets.push(n);

    let mut rotations: Vec<(usize, usize)> = Vec::with_capacity(n);
    for (sid, s) in strings.iter().enumerate() {
        for offset in 0..s.len() {
            rotations.push((sid, offset));
        }
    }
    rotations.sort_by(|&a, &b| cmp_rotations(strings, a, b, n));

    let mut heads = Vec::new();
    let mut lens = Vec::new();
    let mut samples_first = Vec::new();
    let mut samples_last = Vec::new();

    let gca_pos = |sid: usize, offset: usize| string_starts[sid] + offset;

    let mut i = 0;
    while i < rotations.len() {
        let (sid, offset) = rotations[i];
        let len = strings[sid].len();
        let c = char_at(strings, sid, offset + len - 1);

        let run_start = i;
        let mut j = i + 1;
        while j < rotations.len() {
            let (sid2, offset2) = rotations[j];
            let len2 = strings[sid2].len();
            let c2 = char_at(strings, sid2, offset2 + len2 - 1);
            if c2 != c {
                break;
            }
            j += 1;
        }

        heads.push(c);
        lens.push((j - run_start) as u64);
        let (fsid, foffset) = rotations[run_start];
        samples_first.push(gca_pos(fsid, foffset));
        let (lsid, loffset) = rotations[j - 1];
        samples_last.push(gca_pos(lsid, loffset));

        i = j;
    }

    NaiveStreams {
        heads,
        lens,
        samples_first,
        samples_last,
        string_offsets,
        n,
    }
}

/// Builds an `RIndex` over `strings` via `naive_streams`, with block size
/// `block_size` and the given sampling mode. Fails with
/// `Error::InsufficientSamples` when `mode` is `Default` and some string's
/// rotations are entirely absorbed into a run whose first rotation belongs
/// to a different string (e.g. several strings that are each one repeated
/// character) — genuinely possible with brute-force "sample every run"
/// streams, not just with a sparser real sampler.
pub fn try_build_index(
    strings: &[Vec<u8>],
    block_size: usize,
    mode: SampleMode,
) -> eri_index::Result<RIndex> {
    let streams = naive_streams(strings);
    RIndex::build(BuildInput {
        heads: &streams.heads,
        lens: &streams.lens,
        samples_first: &streams.samples_first,
        samples_last: &streams.samples_last,
        string_offsets: &streams.string_offsets,
        block_size,
        sample_mode: mode,
    })
}

/// Builds an `RIndex` over `strings` via `naive_streams`, with block size
/// `block_size` and the default sampling mode. Panics if samples turn out
/// to be insufficient; use `try_build_index` when the input isn't known to
/// avoid that case.
pub fn build_naive_index(strings: &[Vec<u8>], block_size: usize) -> RIndex {
    try_build_index(strings, block_size, SampleMode::Default).unwrap()
}

/// Every occurrence of `pattern` as a circular substring of any string in
/// `strings`, returned as (text position, string index) pairs, computed by
/// brute force.
pub fn naive_locate(strings: &[Vec<u8>], pattern: &[u8]) -> Vec<usize> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let mut string_starts = Vec::with_capacity(strings.len());
    let mut acc = 0usize;
    for s in strings {
        string_starts.push(acc);
        acc += s.len();
    }

    let mut result = Vec::new();
    for (sid, s) in strings.iter().enumerate() {
        let len = s.len();
        // `char_at` wraps via modulo, so a pattern longer than the string
        // itself can still match by reading around the cycle more than
        // once; nothing here needs pattern.len() <= len.
        for offset in 0..len {
            let matches = (0..pattern.len()).all(|k| char_at(strings, sid, offset + k) == pattern[k]);
            if matches {
                result.push(string_starts[sid] + offset);
            }
        }
    }
    result
}
