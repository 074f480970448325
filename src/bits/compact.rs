//! Fixed-width packed integer array
//!
//! Values are packed LSB-first at `w = bits(max)` bits each (minimum 1),
//! so a value may straddle two words.

use super::bit_vector::WORD_BITS;

/// Read-only array of small non-negative integers
#[derive(Debug, Clone)]
pub struct CompactIntArray {
    words: Vec<u64>,
    len: usize,
    width: u32,
    mask: u64,
}

/// Minimal bit width able to hold `max_value`
#[inline]
pub fn bit_width(max_value: u64) -> u32 {
    (u64::BITS - max_value.leading_zeros()).max(1)
}

impl CompactIntArray {
    /// Pack `values`, every one of which must be `<= max_value`
    pub fn new(values: &[u64], max_value: u64) -> Self {
        let width = bit_width(max_value);
        let mask = if width == u64::BITS {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        let total_bits = values.len() * width as usize;
        let mut words = vec![0u64; total_bits.div_ceil(WORD_BITS)];

        for (i, &value) in values.iter().enumerate() {
            assert!(
                value <= max_value,
                "value {} exceeds declared maximum {}",
                value,
                max_value
            );
            let bit = i * width as usize;
            let word_idx = bit / WORD_BITS;
            let offset = bit % WORD_BITS;
            words[word_idx] |= value << offset;
            if offset + width as usize > WORD_BITS {
                words[word_idx + 1] |= value >> (WORD_BITS - offset);
            }
        }

        CompactIntArray {
            words,
            len: values.len(),
            width,
            mask,
        }
    }

    /// Pack `values` at the width of their largest element
    pub fn from_values(values: &[u64]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        Self::new(values, max)
    }

    /// Value at `index`
    #[inline]
    pub fn get(&self, index: usize) -> u64 {
        assert!(index < self.len, "index {} out of range (len {})", index, self.len);
        let bit = index * self.width as usize;
        let word_idx = bit / WORD_BITS;
        let offset = bit % WORD_BITS;
        let mut value = self.words[word_idx] >> offset;
        if offset + self.width as usize > WORD_BITS {
            value |= self.words[word_idx + 1] << (WORD_BITS - offset);
        }
        value & self.mask
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per stored value
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn heap_size(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_bit_width() {
        assert_eq!(bit_width(0), 1);
        assert_eq!(bit_width(1), 1);
        assert_eq!(bit_width(2), 2);
        assert_eq!(bit_width(255), 8);
        assert_eq!(bit_width(256), 9);
        assert_eq!(bit_width(u64::MAX), 64);
    }

    #[test]
    fn test_straddling_values() {
        // width 7 puts index 9 across the first word boundary
        let values: Vec<u64> = (0..40).map(|i| (i * 3) % 128).collect();
        let arr = CompactIntArray::new(&values, 127);
        assert_eq!(arr.width(), 7);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(arr.get(i), v, "index {}", i);
        }
    }

    #[test]
    fn test_all_zero() {
        let arr = CompactIntArray::new(&[0, 0, 0], 0);
        assert_eq!(arr.width(), 1);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(2), 0);
    }

    #[test]
    fn test_full_width() {
        let values = [u64::MAX, 0, 42, u64::MAX - 1];
        let arr = CompactIntArray::from_values(&values);
        assert_eq!(arr.width(), 64);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(arr.get(i), v);
        }
    }

    #[test]
    fn test_random_widths() {
        let mut rng = StdRng::seed_from_u64(7);
        for width in 1..=40u32 {
            let max = (1u64 << width) - 1;
            let values: Vec<u64> = (0..300).map(|_| rng.random_range(0..=max)).collect();
            let arr = CompactIntArray::new(&values, max);
            assert_eq!(arr.width(), width);
            for (i, &v) in values.iter().enumerate() {
                assert_eq!(arr.get(i), v);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_value_above_max_panics() {
        CompactIntArray::new(&[1, 9], 8);
    }
}
