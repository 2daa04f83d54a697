//! Small integer helpers

pub trait Math {
    /// Floor of log base 2
    fn log_2(self) -> usize;
}

impl Math for usize {
    fn log_2(self) -> usize {
        assert!(self > 0);
        (usize::BITS - 1 - self.leading_zeros()) as usize
    }
}

/// The low `num_bits` bits of `val`, least significant first
pub fn to_bits_le(val: u64, num_bits: usize) -> Vec<bool> {
    (0..num_bits).map(|i| (val >> i) & 1 == 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_2() {
        assert_eq!(1usize.log_2(), 0);
        assert_eq!(2usize.log_2(), 1);
        assert_eq!(8usize.log_2(), 3);
        assert_eq!(12usize.log_2(), 3);
        assert_eq!(1024usize.log_2(), 10);
    }

    #[test]
    fn test_to_bits_le() {
        assert_eq!(to_bits_le(0, 4), vec![false, false, false, false]);
        assert_eq!(to_bits_le(1, 4), vec![true, false, false, false]);
        assert_eq!(to_bits_le(5, 4), vec![true, false, true, false]);
        let wide = to_bits_le(0x1_0000_0003, 34);
        assert!(wide[0] && wide[1] && wide[32]);
        assert!(!wide[33]);
    }
}
