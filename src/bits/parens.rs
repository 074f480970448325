//! Balanced Parentheses Topology
//!
//! Tree shape as a parenthesis string: `1` opens a node, `0` closes it.
//! Matching-parenthesis queries are answered with a range min-excess tree:
//!
//! ```text
//! E(p) = opens - closes in [0, p]          (E(-1) = 0)
//!
//! find_close(i) = min { j > i : E(j) <= E(i) - 1 }
//! find_open(j)  = max { p < j : E(p) <= E(j) } + 1
//! enclose(i)    = max { p < i : E(p) <= E(i - 1) - 1 } + 1
//! ```
//!
//! The string is cut into 512-bit blocks. A heap-ordered binary tree stores,
//! for every range of blocks, its total excess and the minimum inclusive
//! prefix excess inside it. A search scans the starting block, climbs until a
//! sibling range can reach the target, descends into it, and scans the final
//! block. Byte lookup tables let block scans skip 8 bits at a time.

use super::bit_vector::BitVector;

const BLOCK_BITS: usize = 512;
const INF: i32 = i32::MAX;

/// Minimum prefix excess over bits 0..=k of a byte, k in 0..8
const BYTE_MIN: [i8; 256] = {
    let mut table = [0i8; 256];
    let mut byte = 0usize;
    while byte < 256 {
        let mut excess: i8 = 0;
        let mut min: i8 = i8::MAX;
        let mut bit = 0;
        while bit < 8 {
            if (byte >> bit) & 1 == 1 {
                excess += 1;
            } else {
                excess -= 1;
            }
            if excess < min {
                min = excess;
            }
            bit += 1;
        }
        table[byte] = min;
        byte += 1;
    }
    table
};

/// Total excess of a byte
const BYTE_SUM: [i8; 256] = {
    let mut table = [0i8; 256];
    let mut byte = 0usize;
    while byte < 256 {
        table[byte] = 2 * (byte as u8).count_ones() as i8 - 8;
        byte += 1;
    }
    table
};

/// Tree topology with matching-parenthesis navigation
#[derive(Debug, Clone)]
pub struct ParenthesisTopology {
    bits: BitVector,
    /// Number of leaves in the heap (a power of two)
    leaves: usize,
    /// Total excess per heap node
    sum: Vec<i32>,
    /// Minimum inclusive prefix excess per heap node, `INF` for padding
    min: Vec<i32>,
}

impl ParenthesisTopology {
    /// Index a balanced parenthesis string
    pub fn new(bits: BitVector) -> Self {
        let len = bits.len();
        let blocks = len.div_ceil(BLOCK_BITS);
        let leaves = blocks.max(1).next_power_of_two();
        let mut sum = vec![0i32; 2 * leaves];
        let mut min = vec![INF; 2 * leaves];

        for block in 0..blocks {
            let start = block * BLOCK_BITS;
            let end = (start + BLOCK_BITS).min(len);
            let (block_sum, block_min) = block_excess(&bits, start, end);
            sum[leaves + block] = block_sum;
            min[leaves + block] = block_min;
        }

        for node in (1..leaves).rev() {
            let (left, right) = (2 * node, 2 * node + 1);
            sum[node] = sum[left] + sum[right];
            min[node] = if min[right] == INF {
                min[left]
            } else {
                min[left].min(sum[left] + min[right])
            };
        }

        ParenthesisTopology {
            bits,
            leaves,
            sum,
            min,
        }
    }

    /// Length of the parenthesis string
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// True when `pos` holds an open parenthesis
    #[inline]
    pub fn is_open(&self, pos: usize) -> bool {
        self.bits.get(pos)
    }

    /// The underlying bit vector (rank/select over opens)
    #[inline]
    pub fn bits(&self) -> &BitVector {
        &self.bits
    }

    /// Inclusive prefix excess `E(pos)`
    #[inline]
    pub fn excess(&self, pos: usize) -> i64 {
        2 * self.bits.rank1(pos) as i64 - (pos as i64 + 1)
    }

    /// Matching close of the open parenthesis at `pos`
    pub fn find_close(&self, pos: usize) -> usize {
        assert!(self.bits.get(pos), "find_close({}) on a close parenthesis", pos);
        let target = self.excess(pos) - 1;
        match self.forward_search(pos, target) {
            Some(close) => close,
            None => panic!("open parenthesis at {} is never closed", pos),
        }
    }

    /// Matching open of the close parenthesis at `pos`
    pub fn find_open(&self, pos: usize) -> usize {
        assert!(!self.bits.get(pos), "find_open({}) on an open parenthesis", pos);
        let target = self.excess(pos);
        match self.backward_search(pos, target) {
            Some(open) => open,
            None => panic!("close parenthesis at {} has no open", pos),
        }
    }

    /// Open position of the nearest strict ancestor of the node opened at `pos`
    pub fn enclose(&self, pos: usize) -> Option<usize> {
        assert!(self.bits.get(pos), "enclose({}) on a close parenthesis", pos);
        if pos == 0 {
            return None;
        }
        let depth_before = self.excess(pos - 1);
        if depth_before == 0 {
            return None;
        }
        self.backward_search(pos, depth_before - 1)
    }

    /// Smallest `j > from` with `E(j) <= target`
    fn forward_search(&self, from: usize, target: i64) -> Option<usize> {
        let len = self.bits.len();
        let mut cur = self.excess(from);
        let block = from / BLOCK_BITS;
        let block_end = ((block + 1) * BLOCK_BITS).min(len);
        if let Some(found) = self.scan_forward(from + 1, block_end, &mut cur, target) {
            return Some(found);
        }

        let mut node = self.leaves + block;
        loop {
            if node == 1 {
                return None;
            }
            if node % 2 == 0 {
                let sibling = node + 1;
                if cur + i64::from(self.min[sibling]) <= target {
                    node = sibling;
                    break;
                }
                cur += i64::from(self.sum[sibling]);
            }
            node /= 2;
        }

        while node < self.leaves {
            let left = 2 * node;
            if cur + i64::from(self.min[left]) <= target {
                node = left;
            } else {
                cur += i64::from(self.sum[left]);
                node = left + 1;
            }
        }

        let start = (node - self.leaves) * BLOCK_BITS;
        let end = (start + BLOCK_BITS).min(len);
        self.scan_forward(start, end, &mut cur, target)
    }

    /// `p + 1` for the largest `p < before` with `E(p) <= target`, counting `p = -1`
    fn backward_search(&self, before: usize, target: i64) -> Option<usize> {
        if before == 0 {
            return (target >= 0).then_some(0);
        }
        let mut cur = self.excess(before - 1);
        let block = (before - 1) / BLOCK_BITS;
        let start = block * BLOCK_BITS;
        if let Some(found) = self.scan_backward(start, before, &mut cur, target) {
            return Some(found + 1);
        }

        let mut node = self.leaves + block;
        loop {
            if node == 1 {
                // Every real position failed, only E(-1) = 0 is left.
                return (target >= 0).then_some(0);
            }
            if node % 2 == 1 {
                let sibling = node - 1;
                let entry = cur - i64::from(self.sum[sibling]);
                if entry + i64::from(self.min[sibling]) <= target {
                    node = sibling;
                    break;
                }
                cur = entry;
            }
            node /= 2;
        }

        // `cur` is the excess at the last position of `node`'s range.
        while node < self.leaves {
            let (left, right) = (2 * node, 2 * node + 1);
            let entry = cur - i64::from(self.sum[right]);
            if self.min[right] != INF && entry + i64::from(self.min[right]) <= target {
                node = right;
            } else {
                cur = entry;
                node = left;
            }
        }

        let start = (node - self.leaves) * BLOCK_BITS;
        let end = (start + BLOCK_BITS).min(self.bits.len());
        self.scan_backward(start, end, &mut cur, target)
            .map(|found| found + 1)
    }

    /// Scan `[from, end)` forward; `cur` enters as `E(from - 1)`
    fn scan_forward(&self, mut pos: usize, end: usize, cur: &mut i64, target: i64) -> Option<usize> {
        while pos < end {
            if pos % 8 == 0 && pos + 8 <= end {
                let byte = self.byte_at(pos);
                if *cur + i64::from(BYTE_MIN[byte]) > target {
                    *cur += i64::from(BYTE_SUM[byte]);
                    pos += 8;
                    continue;
                }
            }
            *cur += if self.bits.get(pos) { 1 } else { -1 };
            if *cur <= target {
                return Some(pos);
            }
            pos += 1;
        }
        None
    }

    /// Scan `[start, end)` backward; `cur` enters as `E(end - 1)` and
    /// leaves as `E(start - 1)` when nothing matches
    fn scan_backward(&self, start: usize, end: usize, cur: &mut i64, target: i64) -> Option<usize> {
        let mut pos = end;
        while pos > start {
            if pos % 8 == 0 && pos - 8 >= start {
                let byte = self.byte_at(pos - 8);
                let entry = *cur - i64::from(BYTE_SUM[byte]);
                if entry + i64::from(BYTE_MIN[byte]) > target {
                    *cur = entry;
                    pos -= 8;
                    continue;
                }
            }
            if *cur <= target {
                return Some(pos - 1);
            }
            *cur -= if self.bits.get(pos - 1) { 1 } else { -1 };
            pos -= 1;
        }
        None
    }

    /// The 8 bits starting at byte-aligned `pos`
    #[inline]
    fn byte_at(&self, pos: usize) -> usize {
        ((self.bits.words()[pos / 64] >> (pos % 64)) & 0xff) as usize
    }

    pub fn heap_size(&self) -> usize {
        self.bits.heap_size()
            + (self.sum.capacity() + self.min.capacity()) * std::mem::size_of::<i32>()
    }
}

/// (total excess, minimum inclusive prefix excess) of `bits[start..end]`
fn block_excess(bits: &BitVector, start: usize, end: usize) -> (i32, i32) {
    let mut run: i32 = 0;
    let mut min: i32 = INF;
    let mut pos = start;
    while pos < end {
        if pos % 8 == 0 && pos + 8 <= end {
            let byte = ((bits.words()[pos / 64] >> (pos % 64)) & 0xff) as usize;
            min = min.min(run + i32::from(BYTE_MIN[byte]));
            run += i32::from(BYTE_SUM[byte]);
            pos += 8;
            continue;
        }
        run += if bits.get(pos) { 1 } else { -1 };
        min = min.min(run);
        pos += 1;
    }
    (run, min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitBuf;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn topology(parens: &str) -> ParenthesisTopology {
        let buf: BitBuf = parens.bytes().map(|b| b == b'(').collect();
        ParenthesisTopology::new(buf.freeze())
    }

    /// Matching positions and parents computed with an explicit stack
    fn oracle(bits: &[bool]) -> (Vec<usize>, Vec<Option<usize>>) {
        let mut matching = vec![0; bits.len()];
        let mut parent = vec![None; bits.len()];
        let mut stack: Vec<usize> = Vec::new();
        for (i, &open) in bits.iter().enumerate() {
            if open {
                parent[i] = stack.last().copied();
                stack.push(i);
            } else {
                let o = stack.pop().unwrap();
                matching[o] = i;
                matching[i] = o;
            }
        }
        assert!(stack.is_empty());
        (matching, parent)
    }

    fn random_balanced(rng: &mut StdRng, pairs: usize, open_bias: f64) -> Vec<bool> {
        let mut bits = Vec::with_capacity(pairs * 2);
        let (mut opens_left, mut depth) = (pairs, 0usize);
        while opens_left > 0 || depth > 0 {
            let open = opens_left > 0 && (depth == 0 || rng.random_bool(open_bias));
            if open {
                opens_left -= 1;
                depth += 1;
            } else {
                depth -= 1;
            }
            bits.push(open);
        }
        bits
    }

    #[test]
    fn test_small_tree() {
        //          0123456789
        let t = topology("(()(()))()");
        assert_eq!(t.find_close(0), 7);
        assert_eq!(t.find_close(1), 2);
        assert_eq!(t.find_close(3), 6);
        assert_eq!(t.find_close(8), 9);
        assert_eq!(t.find_open(7), 0);
        assert_eq!(t.find_open(5), 4);
        assert_eq!(t.enclose(0), None);
        assert_eq!(t.enclose(1), Some(0));
        assert_eq!(t.enclose(4), Some(3));
        assert_eq!(t.enclose(8), None);
        assert_eq!(t.excess(7), 0);
    }

    #[test]
    fn test_deep_chain_crosses_blocks() {
        let depth = 3000;
        let parens = "(".repeat(depth) + &")".repeat(depth);
        let t = topology(&parens);
        assert_eq!(t.find_close(0), 2 * depth - 1);
        assert_eq!(t.find_close(depth - 1), depth);
        assert_eq!(t.find_open(2 * depth - 1), 0);
        assert_eq!(t.enclose(depth - 1), Some(depth - 2));
        assert_eq!(t.enclose(1), Some(0));
    }

    #[test]
    fn test_wide_forest_crosses_blocks() {
        let parens = "()".repeat(2000);
        let t = topology(&parens);
        for i in (0..4000).step_by(2) {
            assert_eq!(t.find_close(i), i + 1);
            assert_eq!(t.find_open(i + 1), i);
            assert_eq!(t.enclose(i), None);
        }
    }

    #[test]
    fn test_against_stack_oracle() {
        let mut rng = StdRng::seed_from_u64(42);
        for &(pairs, bias) in &[(1, 0.5), (40, 0.5), (300, 0.5), (2500, 0.5), (2500, 0.8), (5000, 0.3)] {
            let bits = random_balanced(&mut rng, pairs, bias);
            let (matching, parent) = oracle(&bits);
            let t = ParenthesisTopology::new(bits.iter().copied().collect::<BitBuf>().freeze());
            for (i, &open) in bits.iter().enumerate() {
                if open {
                    assert_eq!(t.find_close(i), matching[i], "find_close({})", i);
                    assert_eq!(t.enclose(i), parent[i], "enclose({})", i);
                } else {
                    assert_eq!(t.find_open(i), matching[i], "find_open({})", i);
                }
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_find_close_on_close_panics() {
        topology("()").find_close(1);
    }
}
