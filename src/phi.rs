//! Predecessor structure over sampled generalized-conjugate-array (gCA)
//! positions, used to answer the `Φ` step that walks occurrences backwards
//! through the text without re-running backward search.
use serde::{Deserialize, Serialize};
use vers_vecs::BitVec;

use crate::error::{Error, Result};
use crate::heap_size::HeapSize;
use crate::sd::EliasFano;
use crate::util;

/// A fixed-width array of non-negative integers, bit-packed.
#[derive(Serialize, Deserialize, Default, Clone)]
struct PackedInts {
    bits: BitVec,
    width: usize,
    len: usize,
}

impl PackedInts {
    fn from_values(values: &[usize], width: usize) -> Self {
        let width = width.max(1);
        let mut bits = BitVec::with_capacity(values.len());
        for &v in values {
            bits.append_bits(v as u64, width);
        }
        PackedInts {
            bits,
            width,
            len: values.len(),
        }
    }

    fn get(&self, i: usize) -> usize {
        debug_assert!(i < self.len);
        self.bits.get_bits_unchecked(i * self.width, self.width) as usize
    }
}

impl HeapSize for PackedInts {
    fn heap_size(&self) -> usize {
        self.bits.heap_size()
    }
}

/// Which sampling strategy the construction pipeline used when it wrote the
/// `.ssam` (start-sample) stream: either one sample per run (`Default`), or
/// the weaker guarantee that only every string's first rotation is sampled
/// (`FirstRotation`), which unlocks a faster but narrower predecessor query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleMode {
    Default,
    FirstRotation,
}

/// Four values needed by `Φ`: the rank of the circular predecessor of `i`,
/// its gCA position, and (when the predecessor wrapped around the end of a
/// string) the start/end positions of the string that was wrapped into.
#[derive(Debug, Clone, Copy)]
pub struct PredecessorQuery {
    pub rank: usize,
    pub pos: usize,
    pub wrap_start: usize,
    pub wrap_end: usize,
}

/// The predecessor data structure for the gCA, built from the
/// `.ssam`/`.esam`/`.spos` construction streams.
#[derive(Serialize, Deserialize)]
pub struct Phi {
    /// sorted first-samples of each run, as a sparse bitvector over gCA
    /// positions.
    pred: EliasFano,
    /// string delimiters (start offsets, plus a trailing sentinel at `n`).
    delim: EliasFano,
    /// text position of the last character of each run, in run order.
    samples_last: PackedInts,
    /// `first_to_run[rank in pred order]` = originating run id.
    first_to_run: PackedInts,
    mode: SampleMode,
}

impl Phi {
    /// Builds the predecessor structure.
    ///
    /// `samples_first[r]`/`samples_last[r]` are the gCA positions of the
    /// first/last character of run `r`, in run order. `string_offsets` is
    /// the strictly increasing sequence of string start offsets terminated
    /// by the eBWT length `n` as a sentinel.
    pub fn build(
        samples_first: &[usize],
        samples_last: &[usize],
        string_offsets: &[usize],
        bwt_len: usize,
        mode: SampleMode,
    ) -> Result<Self> {
        if string_offsets.windows(2).any(|w| w[0] >= w[1])
            || string_offsets.last().copied() != Some(bwt_len)
        {
            return Err(Error::MalformedStringOffsets);
        }
        let delim = EliasFano::new(string_offsets, bwt_len + 1);

        let r = samples_first.len();
        let mut indices: Vec<usize> = (0..r).collect();
        indices.sort_by_key(|&i| samples_first[i]);

        let log_r = util::bitsize(r as u64);
        let log_n = util::bitsize(bwt_len as u64);

        let mut first_to_run_vals = vec![0usize; r];
        let mut sorted_first = vec![0usize; r];
        for (rank, &run) in indices.iter().enumerate() {
            first_to_run_vals[rank] = run;
            sorted_first[rank] = samples_first[run];
        }
        let first_to_run = PackedInts::from_values(&first_to_run_vals, log_r);
        let pred = EliasFano::new(&sorted_first, bwt_len);
        let samples_last = PackedInts::from_values(samples_last, log_n);

        let phi = Phi {
            pred,
            delim,
            samples_last,
            first_to_run,
            mode,
        };
        phi.validate_samples()?;
        Ok(phi)
    }

    fn validate_samples(&self) -> Result<()> {
        let num_strings = self.delim.rank1(self.delim.universe());
        match self.mode {
            SampleMode::Default => {
                let mut prev_rank = 0usize;
                for i in 1..num_strings {
                    let rank = self.pred.rank1(self.delim.select1(i));
                    if prev_rank == rank {
                        return Err(Error::InsufficientSamples { string_index: i });
                    }
                    prev_rank = rank;
                }
            }
            SampleMode::FirstRotation => {
                for i in 0..num_strings.saturating_sub(1) {
                    if !self.pred.at(self.delim.select1(i)) {
                        return Err(Error::InsufficientSamples { string_index: i + 1 });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> SampleMode {
        self.mode
    }

    /// Rank of the `i`-th onset position in `pred` (i.e. its position).
    pub fn select(&self, i: usize) -> usize {
        self.pred.select1(i)
    }

    /// Start offset of the string following the one containing position `i`.
    pub fn next_start_pos(&self, i: usize) -> usize {
        self.delim.select1(self.delim.rank1(i + 1))
    }

    /// Start offset of the string containing position `i`.
    pub fn curr_start_pos(&self, i: usize) -> usize {
        self.delim.select1(self.delim.rank1(i + 1) - 1)
    }

    /// The run that sampled `first_to_run`-rank `i` originated from.
    pub fn f_to_r(&self, i: usize) -> usize {
        self.first_to_run.get(i)
    }

    /// The text position of the last character of run `i`.
    pub fn sample_last(&self, i: usize) -> usize {
        self.samples_last.get(i)
    }

    /// The `first_to_run`-rank of the last run, used to guard the wraparound
    /// case where `f_to_r` would otherwise underflow at rank 0 (Design
    /// Notes open question: a predecessor rank of 0 has no "previous run"
    /// in `first_to_run` order, so it wraps to the structure's last run).
    pub fn last_run(&self) -> usize {
        self.first_to_run.len - 1
    }

    /// Full predecessor query, used by the general (non-`first`-mode) `Φ`.
    pub fn circular_rank_predecessor_tuple(&self, i: usize) -> PredecessorQuery {
        let rank = self.pred.rank1(i + 1);
        if rank == 0 {
            let last_pos = self.delim.select1(1);
            let rank = self.pred.rank1(last_pos);
            return PredecessorQuery {
                rank: rank - 1,
                pos: self.pred.select1(rank - 1),
                wrap_start: 0,
                wrap_end: last_pos - 1,
            };
        }
        let p_pos = self.pred.select1(rank - 1);
        let str_id = self.delim.rank1(i + 1);
        let st_pos = self.delim.select1(str_id - 1);
        if p_pos >= st_pos {
            PredecessorQuery {
                rank: rank - 1,
                pos: p_pos,
                wrap_start: 0,
                wrap_end: 0,
            }
        } else {
            let last_pos = self.delim.select1(str_id);
            let rank = self.pred.rank1(last_pos);
            PredecessorQuery {
                rank: rank - 1,
                pos: self.pred.select1(rank - 1),
                wrap_start: st_pos,
                wrap_end: last_pos - 1,
            }
        }
    }

    /// Fast-path predecessor rank, valid only when `mode() ==
    /// SampleMode::FirstRotation` (every string start is itself sampled, so
    /// the rank never needs the wraparound handling above).
    pub fn circular_rank_predecessor_first(&self, i: usize) -> usize {
        self.pred.rank1(i + 1) - 1
    }
}

impl HeapSize for Phi {
    fn heap_size(&self) -> usize {
        self.pred.heap_size()
            + self.delim.heap_size()
            + self.samples_last.heap_size()
            + self.first_to_run.heap_size()
    }
}
