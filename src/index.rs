//! The r-index orchestrator: backward search (`count`), the toehold-carrying
//! variant that seeds `locate`, and the `Φ` predecessor step that expands a
//! count range into the occurrences it represents.
use crate::error::Result;
use crate::heap_size::HeapSize;
use crate::phi::{Phi, SampleMode};
use crate::rle::Rle;

/// An inclusive range `[lo, hi]` into the generalized conjugate array.
/// `hi < lo` represents the empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub lo: usize,
    pub hi: usize,
}

impl Range {
    pub fn empty() -> Self {
        Range { lo: 1, hi: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.hi < self.lo
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.hi - self.lo + 1
        }
    }
}

/// Construction input: the five streams a prefix-free-parse-based producer
/// emits, plus the block size and sampling mode used while building them.
pub struct BuildInput<'a> {
    pub heads: &'a [u8],
    pub lens: &'a [u64],
    pub samples_first: &'a [usize],
    pub samples_last: &'a [usize],
    pub string_offsets: &'a [usize],
    pub block_size: usize,
    pub sample_mode: SampleMode,
}

/// The r-index over an eBWT of a multiset of strings.
pub struct RIndex {
    rle: Rle,
    phi: Phi,
    block_size: usize,
}

impl RIndex {
    /// Builds the index from the construction streams.
    pub fn build(input: BuildInput) -> Result<Self> {
        log::info!("(1/3) compute the run-length eBWT data structure");
        let rle = Rle::build(input.heads, input.lens, input.block_size)?;
        log::debug!(
            "eBWT length {}, {} equal-letter runs",
            rle.size(),
            rle.nrun()
        );

        log::info!("(2/3) compute the predecessor search data structure");
        let phi = Phi::build(
            input.samples_first,
            input.samples_last,
            input.string_offsets,
            rle.size(),
            input.sample_mode,
        )?;

        log::info!("(3/3) eBWT r-index built");
        Ok(RIndex {
            rle,
            phi,
            block_size: input.block_size,
        })
    }

    pub(crate) fn from_parts(rle: Rle, phi: Phi, block_size: usize) -> Self {
        RIndex {
            rle,
            phi,
            block_size,
        }
    }

    pub(crate) fn rle(&self) -> &Rle {
        &self.rle
    }

    pub(crate) fn phi_ref(&self) -> &Phi {
        &self.phi
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn sample_mode(&self) -> SampleMode {
        self.phi.mode()
    }

    /// Length of the indexed eBWT (sum of all input string lengths).
    pub fn len(&self) -> usize {
        self.rle.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rle.size() == 0
    }

    fn lf(&self, range: Range, c: u8) -> Range {
        let cu = c as usize;
        if self.rle.c(cu) >= self.rle.c(cu + 1) {
            return Range::empty();
        }
        let before = self.rle.rank(range.lo, c);
        let inside = self.rle.rank(range.hi + 1, c) - before;
        if inside == 0 {
            return Range::empty();
        }
        let lo = self.rle.c(cu) + before;
        Range {
            lo,
            hi: lo + inside - 1,
        }
    }

    /// Returns the gCA range matching pattern `pattern`. The number of
    /// occurrences is `range.len()`.
    ///
    /// An empty pattern always returns the empty range.
    pub fn count(&self, pattern: &[u8]) -> Range {
        if self.is_empty() || pattern.is_empty() {
            return Range::empty();
        }
        let mut range = Range {
            lo: 0,
            hi: self.rle.size() - 1,
        };
        for i in 0..pattern.len() {
            if range.is_empty() {
                break;
            }
            let c = pattern[pattern.len() - 1 - i];
            range = self.lf(range, c);
        }
        range
    }

    fn prev_run_of_first_to_run_rank(&self, rank: usize) -> usize {
        let run_id = self.phi.f_to_r(rank);
        if run_id == 0 {
            self.phi.last_run()
        } else {
            run_id - 1
        }
    }

    fn phi_from(&self, prev_run: usize, delta: usize) -> usize {
        let prev_sample = self.phi.sample_last(prev_run);
        let next = self.phi.next_start_pos(prev_sample);
        if prev_sample + delta < next {
            prev_sample + delta
        } else {
            self.phi.curr_start_pos(prev_sample) + (prev_sample + delta) % next
        }
    }

    /// The predecessor of `i` in gCA order.
    pub fn phi(&self, i: usize) -> usize {
        let q = self.phi.circular_rank_predecessor_tuple(i);
        let delta = if q.pos <= i {
            i - q.pos
        } else {
            (i - q.wrap_start) + (q.wrap_end - q.pos + 1)
        };
        let prev_run = self.prev_run_of_first_to_run_rank(q.rank);
        self.phi_from(prev_run, delta)
    }

    /// The predecessor of `i` in gCA order, valid only when
    /// `sample_mode() == SampleMode::FirstRotation`.
    pub fn phi_first(&self, i: usize) -> usize {
        let jr = self.phi.circular_rank_predecessor_first(i);
        let j = self.phi.select(jr);
        let delta = i - j;
        let prev_run = self.prev_run_of_first_to_run_rank(jr);
        self.phi_from(prev_run, delta)
    }

    /// `count`, additionally returning a "toehold" gCA sample corresponding
    /// to the last occurrence in the matched range, carried incrementally
    /// through the backward search instead of recomputed from scratch.
    pub fn count_and_get_occ(&self, pattern: &[u8]) -> (Range, usize) {
        let n = self.rle.size();
        if n == 0 || pattern.is_empty() {
            return (Range::empty(), 0);
        }
        let mut range = Range { lo: 0, hi: n - 1 };
        let mut k = self.phi.sample_last(self.rle.nrun() - 1);
        let mut ks = self.phi.curr_start_pos(k);

        for i in 0..pattern.len() {
            if range.is_empty() {
                break;
            }
            let c = pattern[pattern.len() - 1 - i];
            let range1 = self.lf(range, c);
            if !range1.is_empty() {
                if self.rle.get(range.hi) == c {
                    if k > ks {
                        k -= 1;
                    } else {
                        k = self.phi.next_start_pos(k) - 1;
                    }
                } else {
                    let rnk = self.rle.rank(range.hi, c) - 1;
                    let j = self.rle.select(rnk, c);
                    let run_of_j = self.rle.run_of_position(j);
                    k = self.phi.sample_last(run_of_j);
                    ks = self.phi.curr_start_pos(k);
                    if k != ks {
                        k -= 1;
                    } else {
                        k = self.phi.next_start_pos(k) - 1;
                    }
                }
            }
            range = range1;
        }
        (range, k)
    }

    /// All occurrences of `pattern`, as gCA (text) positions.
    pub fn locate(&self, pattern: &[u8]) -> Vec<usize> {
        let (range, k) = self.count_and_get_occ(pattern);
        if range.is_empty() {
            return Vec::new();
        }
        let n_occ = range.len();
        let mut occ = Vec::with_capacity(n_occ);
        occ.push(k);
        let mut cur = k;
        for _ in 1..n_occ {
            cur = match self.phi.mode() {
                SampleMode::FirstRotation => self.phi_first(cur),
                SampleMode::Default => self.phi(cur),
            };
            occ.push(cur);
        }
        occ
    }

    /// Serializes the index to `.eri` archive bytes.
    pub fn serialize<W: std::io::Write>(&self, out: W) -> Result<()> {
        crate::io::write_archive(out, self)
    }

    /// Loads an index previously written by `serialize`.
    pub fn load<R: std::io::Read>(input: R) -> Result<Self> {
        crate::io::read_archive(input)
    }
}

impl HeapSize for RIndex {
    fn heap_size(&self) -> usize {
        self.rle.heap_size() + self.phi.heap_size()
    }
}
