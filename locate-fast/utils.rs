//! Utility functions for corner detection algorithms

/// Check if there are at least `min_count` consecutive set bits in the circular mask
pub fn has_consecutive_bits(mask: u16, min_count: usize) -> bool {
    if min_count > 16 || min_count == 0 {
        return false;
    }

    // A run of n bits survives n-1 rotate-and-AND steps
    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i as u32);
        if test_mask == 0 {
            return false;
        }
    }

    test_mask != 0
}
