//! Run-length encoded eBWT: rank, select and random access in time
//! proportional to the number of runs, not the text length.
use serde::{Deserialize, Serialize};
use vers_vecs::WaveletMatrix;

use crate::error::{Error, Result};
use crate::heap_size::HeapSize;
use crate::sd::EliasFano;
use crate::util;

pub const SIGMA: usize = 128;

/// A run-length encoded eBWT.
///
/// Built from a stream of run heads and run lengths (the `.head`/`.len`
/// construction files), it exposes `rank`, `select`, run lookups and the
/// cumulative character table (`C`) a backward search step needs.
#[derive(Serialize, Deserialize)]
pub struct Rle {
    /// wavelet tree over the R run heads, in BWT (run) order.
    heads: WaveletMatrix,
    /// onset = BWT position at the end of every B-th run.
    main_bv: EliasFano,
    /// per-character onset of cumulative run-lengths; `letter_bv[c]` is
    /// `None` when `c` never occurs.
    letter_bv: Vec<Option<EliasFano>>,
    /// cumulative counts: `c_table[c]` is the number of eBWT positions with
    /// a character `< c`; `c_table[SIGMA]` is the eBWT length.
    c_table: [usize; SIGMA + 1],
    bwt_len: usize,
    nrun: usize,
    block_size: usize,
}

impl Rle {
    /// Builds the run-length eBWT from parallel run-heads/run-lengths
    /// streams (see `io::read_heads`/`io::read_lengths`).
    pub fn build(heads: &[u8], lens: &[u64], block_size: usize) -> Result<Self> {
        if heads.len() != lens.len() {
            return Err(Error::RunCountMismatch {
                heads: heads.len(),
                lens: lens.len(),
            });
        }
        let nrun = heads.len();
        let block_size = block_size.max(1);

        let mut counts = [0usize; SIGMA];
        let mut onset_letter: Vec<Vec<usize>> = vec![Vec::new(); SIGMA];
        let mut onset_main = Vec::with_capacity(nrun / block_size + 1);
        let mut bwt_len = 0usize;

        for (i, (&head, &len)) in heads.iter().zip(lens.iter()).enumerate() {
            let c = head as usize;
            if len > 1 {
                counts[c] += (len - 1) as usize;
                bwt_len += (len - 1) as usize;
            }
            onset_letter[c].push(counts[c]);
            if i % block_size == block_size - 1 {
                onset_main.push(bwt_len);
            }
            bwt_len += 1;
            counts[c] += 1;
        }

        let main_bv = EliasFano::new(&onset_main, bwt_len);
        let letter_bv = onset_letter
            .into_iter()
            .zip(counts.iter())
            .map(|(onset, &count)| {
                if count > 0 {
                    Some(EliasFano::new(&onset, count))
                } else {
                    None
                }
            })
            .collect();

        let mut c_table = [0usize; SIGMA + 1];
        for c in 0..SIGMA {
            c_table[c + 1] = c_table[c] + counts[c];
        }

        let head_values: Vec<u64> = heads.iter().map(|&b| b as u64).collect();
        let bits = util::log2((SIGMA - 1) as u64) as u16 + 1;
        let heads_wt = WaveletMatrix::from_slice(&head_values, bits);

        Ok(Rle {
            heads: heads_wt,
            main_bv,
            letter_bv,
            c_table,
            bwt_len,
            nrun,
            block_size,
        })
    }

    pub fn size(&self) -> usize {
        self.bwt_len
    }

    pub fn nrun(&self) -> usize {
        self.nrun
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Cumulative character table: `c(c)` is the number of eBWT symbols
    /// strictly smaller than `c`. Returns the eBWT length for `c >= SIGMA`.
    pub fn c(&self, c: usize) -> usize {
        if c >= self.c_table.len() {
            self.bwt_len
        } else {
            self.c_table[c]
        }
    }

    fn run_head(&self, run: usize) -> u8 {
        self.heads.get_u64_unchecked(run) as u8
    }

    fn run_length_at(&self, run: usize) -> usize {
        let c = self.run_head(run);
        let rank = self.heads.rank_u64_unchecked(run, c as u64);
        self.letter_bv[c as usize]
            .as_ref()
            .expect("run head character must have a non-empty letter bitvector")
            .gap(rank)
    }

    /// Returns `(run, last_position_of_run)` for the run containing text
    /// position `i`.
    pub fn run_of(&self, i: usize) -> (usize, usize) {
        let last_block = self.main_bv.rank1(i);
        let mut run = last_block * self.block_size;
        let mut pos = if last_block > 0 {
            self.main_bv.select1(last_block - 1) + 1
        } else {
            0
        };
        while pos < i {
            pos += self.run_length_at(run);
            run += 1;
        }
        if pos > i {
            run -= 1;
        } else {
            pos += self.run_length_at(run);
        }
        (run, pos - 1)
    }

    /// Returns the run containing text position `i`.
    pub fn run_of_position(&self, i: usize) -> usize {
        let last_block = self.main_bv.rank1(i);
        let mut run = last_block * self.block_size;
        let mut pos = if last_block > 0 {
            self.main_bv.select1(last_block - 1) + 1
        } else {
            0
        };
        while pos < i {
            pos += self.run_length_at(run);
            run += 1;
        }
        if pos > i {
            run -= 1;
        }
        run
    }

    /// The eBWT symbol at text position `i`.
    pub fn get(&self, i: usize) -> u8 {
        self.run_head(self.run_of_position(i))
    }

    /// Number of occurrences of `c` in `eBWT[0, i)`.
    pub fn rank(&self, i: usize, c: u8) -> usize {
        if i == self.bwt_len {
            return self.letter_bv[c as usize]
                .as_ref()
                .map(EliasFano::len)
                .unwrap_or(0);
        }
        let last_block = self.main_bv.rank1(i);
        let mut run = last_block * self.block_size;
        let mut pos = if last_block > 0 {
            self.main_bv.select1(last_block - 1) + 1
        } else {
            0
        };
        let mut dist = i - pos;
        while pos < i {
            pos += self.run_length_at(run);
            run += 1;
            if pos <= i {
                dist = i - pos;
            }
        }
        if pos > i {
            run -= 1;
        }
        let rk = self.heads.rank_u64_unchecked(run, c as u64);
        let tail = if self.run_head(run) == c { dist } else { 0 };
        if rk == 0 {
            return tail;
        }
        self.letter_bv[c as usize]
            .as_ref()
            .expect("rk > 0 implies c occurs")
            .select1(rk - 1)
            + 1
            + tail
    }

    /// Position of the `i`-th (0-indexed) occurrence of `c`.
    pub fn select(&self, i: usize, c: u8) -> usize {
        let letter_bv = self.letter_bv[c as usize]
            .as_ref()
            .expect("select called for a character absent from the eBWT");
        let j = letter_bv.rank1(i);
        let before = if j == 0 {
            i
        } else {
            i - (letter_bv.select1(j - 1) + 1)
        };
        let r = self.heads.select_u64_unchecked(j, c as u64);
        let mut k = if r / self.block_size == 0 {
            0
        } else {
            self.main_bv.select1(r / self.block_size - 1) + 1
        };
        for t in (r / self.block_size) * self.block_size..r {
            k += self.run_length_at(t);
        }
        k + before
    }
}

impl HeapSize for Rle {
    fn heap_size(&self) -> usize {
        self.heads.heap_size()
            + self.main_bv.heap_size()
            + self
                .letter_bv
                .iter()
                .filter_map(|l| l.as_ref())
                .map(EliasFano::heap_size)
                .sum::<usize>()
    }
}
