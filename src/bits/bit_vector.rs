//! Rank/Select Bit Vector
//!
//! A write-once bit array with constant-time rank and logarithmic select.
//!
//! Bits are appended to a [`BitBuf`] during the build pass and frozen into a
//! [`BitVector`], which adds a two-level population count directory:
//!
//! ```text
//! superblocks: absolute 1-count before every 512-bit block (+ trailing total)
//! blocks:      1-count before every 64-bit word, relative to its superblock
//! ```
//!
//! `rank1` is two table lookups plus one `count_ones`. `select` binary-searches
//! the superblock table and then scans at most eight words.

pub(crate) const WORD_BITS: usize = 64;
const WORDS_PER_SUPERBLOCK: usize = 8;
const SUPERBLOCK_BITS: usize = WORD_BITS * WORDS_PER_SUPERBLOCK;

/// Growable bit array used while building
#[derive(Debug, Clone, Default)]
pub struct BitBuf {
    words: Vec<u64>,
    len: usize,
}

impl BitBuf {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `bits` bits
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    /// Number of bits appended so far
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one bit
    #[inline]
    pub fn push(&mut self, bit: bool) {
        let bit_idx = self.len % WORD_BITS;
        if bit_idx == 0 {
            self.words.push(0);
        }
        if bit {
            let last = self.words.len() - 1;
            self.words[last] |= 1u64 << bit_idx;
        }
        self.len += 1;
    }

    /// Append `count` copies of `bit`
    pub fn push_repeated(&mut self, bit: bool, count: usize) {
        for _ in 0..count {
            self.push(bit);
        }
    }

    /// Read back a bit that has already been appended
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit {} out of range (len {})", index, self.len);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Freeze into a rank/select structure
    pub fn freeze(self) -> BitVector {
        BitVector::new(self.words, self.len)
    }
}

impl FromIterator<bool> for BitBuf {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buf = BitBuf::new();
        for bit in iter {
            buf.push(bit);
        }
        buf
    }
}

/// Immutable bit vector with rank/select support
#[derive(Debug, Clone)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
    ones: usize,
    /// Absolute 1-count before each superblock, plus the total at the end
    superblocks: Vec<u64>,
    /// 1-count before each word, relative to the word's superblock
    blocks: Vec<u16>,
}

impl BitVector {
    /// Build the rank directory over `len` bits stored LSB-first in `words`
    pub fn new(mut words: Vec<u64>, len: usize) -> Self {
        let word_count = len.div_ceil(WORD_BITS);
        assert!(
            words.len() >= word_count,
            "{} words cannot hold {} bits",
            words.len(),
            len
        );
        words.truncate(word_count);
        words.shrink_to_fit();

        // Padding bits must be zero, select0 relies on it.
        if len % WORD_BITS != 0 {
            let last = word_count - 1;
            words[last] &= (1u64 << (len % WORD_BITS)) - 1;
        }

        let mut superblocks = Vec::with_capacity(word_count.div_ceil(WORDS_PER_SUPERBLOCK) + 1);
        let mut blocks = Vec::with_capacity(word_count);
        let mut total: u64 = 0;
        let mut superblock_start: u64 = 0;

        for (i, word) in words.iter().enumerate() {
            if i % WORDS_PER_SUPERBLOCK == 0 {
                superblocks.push(total);
                superblock_start = total;
            }
            blocks.push((total - superblock_start) as u16);
            total += u64::from(word.count_ones());
        }
        superblocks.push(total);

        BitVector {
            words,
            len,
            ones: total as usize,
            superblocks,
            blocks,
        }
    }

    /// Number of bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of 1-bits
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Total number of 0-bits
    #[inline]
    pub fn count_zeros(&self) -> usize {
        self.len - self.ones
    }

    /// The bit at `index`
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit {} out of range (len {})", index, self.len);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Number of 1-bits in `[0, index]`
    #[inline]
    pub fn rank1(&self, index: usize) -> usize {
        assert!(index < self.len, "rank {} out of range (len {})", index, self.len);
        let word_idx = index / WORD_BITS;
        let bit_idx = index % WORD_BITS;
        let mask = if bit_idx == WORD_BITS - 1 {
            u64::MAX
        } else {
            (1u64 << (bit_idx + 1)) - 1
        };
        self.superblocks[word_idx / WORDS_PER_SUPERBLOCK] as usize
            + self.blocks[word_idx] as usize
            + (self.words[word_idx] & mask).count_ones() as usize
    }

    /// Number of 0-bits in `[0, index]`
    #[inline]
    pub fn rank0(&self, index: usize) -> usize {
        index + 1 - self.rank1(index)
    }

    /// Position of the `(k + 1)`-th 1-bit
    ///
    /// # Panics
    ///
    /// Panics if the vector holds `k` or fewer 1-bits.
    pub fn select1(&self, k: usize) -> usize {
        assert!(k < self.ones, "select1({}) with only {} ones", k, self.ones);
        self.select(k, true)
    }

    /// Position of the `(k + 1)`-th 0-bit
    ///
    /// # Panics
    ///
    /// Panics if the vector holds `k` or fewer 0-bits.
    pub fn select0(&self, k: usize) -> usize {
        assert!(
            k < self.count_zeros(),
            "select0({}) with only {} zeros",
            k,
            self.count_zeros()
        );
        self.select(k, false)
    }

    /// Count of `bit` values before superblock `sb`
    #[inline]
    fn count_before(&self, sb: usize, bit: bool) -> usize {
        let ones = self.superblocks[sb] as usize;
        if bit {
            ones
        } else {
            sb * SUPERBLOCK_BITS - ones
        }
    }

    fn select(&self, k: usize, bit: bool) -> usize {
        // Largest superblock whose prefix count is <= k.
        let superblock_count = self.superblocks.len() - 1;
        let (mut lo, mut hi) = (0usize, superblock_count);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.count_before(mid, bit) <= k {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let mut remaining = k - self.count_before(lo, bit);
        let first_word = lo * WORDS_PER_SUPERBLOCK;
        let end_word = (first_word + WORDS_PER_SUPERBLOCK).min(self.words.len());
        for word_idx in first_word..end_word {
            let word = if bit {
                self.words[word_idx]
            } else {
                !self.words[word_idx]
            };
            let count = word.count_ones() as usize;
            if remaining < count {
                return word_idx * WORD_BITS + select_in_word(word, remaining);
            }
            remaining -= count;
        }
        panic!("rank directory is inconsistent with select({}, {})", k, bit)
    }

    /// Backing words, LSB-first
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Bytes held on the heap
    pub fn heap_size(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<u64>()
            + self.superblocks.capacity() * std::mem::size_of::<u64>()
            + self.blocks.capacity() * std::mem::size_of::<u16>()
    }
}

/// Position of the `(k + 1)`-th set bit inside `word`
#[inline]
fn select_in_word(mut word: u64, k: usize) -> usize {
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn from_str(bits: &str) -> BitVector {
        bits.bytes().map(|b| b == b'1').collect::<BitBuf>().freeze()
    }

    #[test]
    fn test_get_and_rank() {
        let bv = from_str("1101001");
        assert_eq!(bv.len(), 7);
        assert!(bv.get(0));
        assert!(!bv.get(2));
        assert_eq!(bv.rank1(0), 1);
        assert_eq!(bv.rank1(3), 3);
        assert_eq!(bv.rank1(6), 4);
        assert_eq!(bv.rank0(6), 3);
        assert_eq!(bv.count_ones(), 4);
    }

    #[test]
    fn test_select() {
        let bv = from_str("1101001");
        assert_eq!(bv.select1(0), 0);
        assert_eq!(bv.select1(1), 1);
        assert_eq!(bv.select1(2), 3);
        assert_eq!(bv.select1(3), 6);
        assert_eq!(bv.select0(0), 2);
        assert_eq!(bv.select0(2), 5);
    }

    #[test]
    #[should_panic]
    fn test_select_past_end_panics() {
        let bv = from_str("101");
        bv.select1(2);
    }

    #[test]
    fn test_word_boundaries() {
        let mut buf = BitBuf::new();
        buf.push_repeated(false, 63);
        buf.push(true);
        buf.push(true);
        buf.push_repeated(false, 64);
        buf.push(true);
        let bv = buf.freeze();
        assert_eq!(bv.len(), 130);
        assert_eq!(bv.rank1(63), 1);
        assert_eq!(bv.rank1(64), 2);
        assert_eq!(bv.rank1(128), 2);
        assert_eq!(bv.rank1(129), 3);
        assert_eq!(bv.select1(0), 63);
        assert_eq!(bv.select1(2), 129);
        assert_eq!(bv.select0(63), 65);
    }

    #[test]
    fn test_select0_ignores_padding() {
        let bv = from_str("0110");
        assert_eq!(bv.count_zeros(), 2);
        assert_eq!(bv.select0(1), 3);
    }

    #[test]
    fn test_rank_select_random() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for &len in &[1usize, 64, 511, 512, 513, 4096, 10_007] {
            let bits: Vec<bool> = (0..len).map(|_| rng.random_bool(0.3)).collect();
            let bv = bits.iter().copied().collect::<BitBuf>().freeze();

            let mut ones = 0;
            for (i, &bit) in bits.iter().enumerate() {
                if bit {
                    ones += 1;
                    assert_eq!(bv.select1(ones - 1), i);
                } else {
                    assert_eq!(bv.select0(i + 1 - ones - 1), i);
                }
                assert_eq!(bv.rank1(i), ones, "rank1({}) len {}", i, len);
            }
            assert_eq!(bv.count_ones(), ones);
            for k in 0..bv.count_ones() {
                assert_eq!(bv.rank1(bv.select1(k)), k + 1);
            }
        }
    }

    #[test]
    fn test_new_masks_padding() {
        let bv = BitVector::new(vec![u64::MAX], 3);
        assert_eq!(bv.count_ones(), 3);
        assert_eq!(bv.words()[0], 0b111);
    }
}
