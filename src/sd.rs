//! Elias-Fano encoded bitvectors for the sparse onset sets used throughout
//! the index (run boundaries, per-character run positions, predecessor
//! samples, string delimiters).
use serde::{Deserialize, Serialize};
use vers_vecs::BitVec;

use crate::heap_size::HeapSize;
use crate::util;

/// An Elias-Fano encoded, strictly increasing set of positions in
/// `[0, universe)`.
///
/// The onset is split into a high part (the bucket a position falls into,
/// recorded as a cumulative per-bucket count) and a low part (bit-packed,
/// fixed-width, one entry per onset position).
#[derive(Serialize, Deserialize, Clone)]
pub struct EliasFano {
    universe: usize,
    len: usize,
    low_width: usize,
    low: BitVec,
    /// `high_start[h]` = number of onset positions with high part `< h`.
    /// Has `(universe >> low_width) + 2` entries.
    high_start: Vec<usize>,
}

impl Default for EliasFano {
    fn default() -> Self {
        EliasFano {
            universe: 0,
            len: 0,
            low_width: 0,
            low: BitVec::new(),
            high_start: vec![0],
        }
    }
}

fn low_width_for(universe: usize, len: usize) -> usize {
    if len == 0 || universe <= len {
        return 0;
    }
    util::log2((universe / len) as u64) as usize
}

impl EliasFano {
    /// Builds an Elias-Fano vector over the given universe from a strictly
    /// increasing slice of onset positions, all `< universe`.
    pub fn new(onset: &[usize], universe: usize) -> Self {
        if onset.is_empty() {
            return EliasFano {
                universe,
                ..EliasFano::default()
            };
        }
        debug_assert!(onset.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(*onset.last().unwrap() < universe);

        let len = onset.len();
        let low_width = low_width_for(universe, len);
        let low_mask = if low_width == 0 {
            0
        } else {
            (1usize << low_width) - 1
        };
        let num_buckets = (universe >> low_width) + 1;
        let mut high_start = vec![0usize; num_buckets + 1];
        let mut low = BitVec::with_capacity(len);
        for &x in onset {
            let h = x >> low_width;
            high_start[h + 1] += 1;
            low.append_bits((x & low_mask) as u64, low_width.max(1));
        }
        for i in 1..high_start.len() {
            high_start[i] += high_start[i - 1];
        }

        EliasFano {
            universe,
            len,
            low_width,
            low,
            high_start,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    fn low_at(&self, i: usize) -> usize {
        if self.low_width == 0 {
            0
        } else {
            self.low.get_bits_unchecked(i * self.low_width, self.low_width) as usize
        }
    }

    fn bucket_start(&self, h: usize) -> usize {
        self.high_start.get(h).copied().unwrap_or(self.len)
    }

    /// Number of onset positions strictly less than `i`.
    pub fn rank1(&self, i: usize) -> usize {
        if self.len == 0 {
            return 0;
        }
        let low_mask = if self.low_width == 0 {
            0
        } else {
            (1usize << self.low_width) - 1
        };
        let h = i >> self.low_width;
        let target_low = i & low_mask;
        let mut lo = self.bucket_start(h);
        let mut hi = self.bucket_start(h + 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.low_at(mid) < target_low {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Position of the `i`-th (0-indexed) onset position.
    pub fn select1(&self, i: usize) -> usize {
        debug_assert!(i < self.len);
        let mut lo = 0usize;
        let mut hi = self.high_start.len() - 1;
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if self.high_start[mid] <= i {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo << self.low_width) | self.low_at(i)
    }

    /// Whether `i` is in the onset.
    pub fn at(&self, i: usize) -> bool {
        let r = self.rank1(i);
        r < self.len && self.select1(r) == i
    }

    /// Gap between the `i`-th and `(i - 1)`-th onset positions; for `i == 0`
    /// this is `select1(0) + 1`.
    pub fn gap(&self, i: usize) -> usize {
        if i == 0 {
            self.select1(0) + 1
        } else {
            self.select1(i) - self.select1(i - 1)
        }
    }
}

impl HeapSize for EliasFano {
    fn heap_size(&self) -> usize {
        self.low.heap_size() + self.high_start.capacity() * std::mem::size_of::<usize>()
    }
}
