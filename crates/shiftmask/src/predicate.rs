//! Fold-safety predicate.
//!
//! Decides, from the mask and shift alone, whether `folded_formula` may
//! replace `base_formula` for every value of the domain. Only quantities
//! known before any value is seen are read: the mask, the shift, the
//! domain width and the mask's leading-zero count.
//!
//! # Derivation
//!
//! Let `W` be the domain width. Right shifting a value by `shift` leaves
//! bits `[0, W - shift)` meaningful and pads everything above with zeros
//! (unsigned) or copies of the sign bit (signed). Folding is safe when the
//! mask's highest set bit stays inside the meaningful region:
//!
//! ```text
//! A = W - shift          first padded bit, counted from the bottom
//! B = |Z - W|            one past the mask's highest set bit
//! safe  <=>  A >= B
//! ```
//!
//! `Z` is the leading-zero count of the mask's raw pattern zero-extended
//! into the native register, minus the `NATIVE_BITS - W` excess, so it lies
//! in `[0, W]` for both signednesses. Below the padding an arithmetic shift
//! reads the same value bits a logical one does, so signed masks need no
//! separate treatment. In particular the sign bit is never cleared before
//! counting: a mask carrying it has `B = W` and folds at shift zero only.

use std::ops::RangeInclusive;

use crate::domain::FoldDomain;

/// `B`: one past the index of the mask's highest set bit. Zero for a zero
/// mask.
#[inline]
pub fn first_set_index<D: FoldDomain>(mask: D) -> i32 {
    let width = D::BITS as i32;
    let excess = D::NATIVE_BITS as i32 - width;
    let zeros = mask.native_leading_zeros() as i32 - excess;
    (zeros - width).abs()
}

/// Whether `(value & (mask << shift)) != 0` equals
/// `((value >> shift) & mask) != 0` for every value of `D`.
///
/// `shift` must be below `D::BITS`.
#[inline]
pub fn is_fold_safe<D: FoldDomain>(mask: D, shift: u32) -> bool {
    debug_assert!(shift < D::BITS, "shift {shift} out of range for {}", D::NAME);
    let a = D::BITS as i32 - shift as i32;
    let b = first_set_index(mask);
    a >= b
}

/// The shifts for which `mask` may be folded.
///
/// The safe shifts always form a prefix `0..=N`, and shift zero is safe for
/// every mask.
pub fn safe_shift_range<D: FoldDomain>(mask: D) -> RangeInclusive<u32> {
    let headroom = (D::BITS as i32 - first_set_index(mask)) as u32;
    0..=headroom.min(D::BITS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{base_formula, folded_formula};

    #[test]
    fn test_low_nibble_folds_at_four() {
        assert!(is_fold_safe(0b0000_1111u8, 4));
        assert!(!is_fold_safe(0b0000_1111u8, 5));
    }

    #[test]
    fn test_high_nibble_overflows() {
        assert!(!is_fold_safe(0b1111_0000u8, 4));
        assert!(is_fold_safe(0b1111_0000u8, 0));
    }

    #[test]
    fn test_first_set_index() {
        assert_eq!(first_set_index(0u8), 0);
        assert_eq!(first_set_index(1u8), 1);
        assert_eq!(first_set_index(0x0fu8), 4);
        assert_eq!(first_set_index(0xffu8), 8);
        assert_eq!(first_set_index(0x7fi8), 7);
        assert_eq!(first_set_index(-1i8), 8);
        assert_eq!(first_set_index(i8::MIN), 8);
        assert_eq!(first_set_index(0x4000i16), 15);
        assert_eq!(first_set_index(u64::MAX), 64);
        assert_eq!(first_set_index(1u128 << 100), 101);
        assert_eq!(first_set_index(-1i128), 128);
    }

    #[test]
    fn test_zero_mask_is_safe_for_every_shift() {
        for shift in 0..8 {
            assert!(is_fold_safe(0u8, shift));
            assert!(is_fold_safe(0i8, shift));
        }
        for shift in 0..128 {
            assert!(is_fold_safe(0u128, shift));
            assert!(is_fold_safe(0i128, shift));
        }
    }

    #[test]
    fn test_full_masks_fold_only_unshifted() {
        assert!(is_fold_safe(u8::MAX, 0));
        assert!(!is_fold_safe(u8::MAX, 1));
        assert!(is_fold_safe(-1i8, 0));
        assert!(!is_fold_safe(-1i8, 1));
        assert!(is_fold_safe(u16::MAX, 0));
        assert!(is_fold_safe(i16::MAX, 0));
        assert!(is_fold_safe(u64::MAX, 0));
    }

    #[test]
    fn test_sign_bit_masks_fold_only_unshifted() {
        assert!(is_fold_safe(i8::MIN, 0));
        assert!(is_fold_safe(i32::MIN | 1, 0));
        for shift in 1..8 {
            assert!(!is_fold_safe(i8::MIN, shift));
            assert!(!is_fold_safe(-1i8, shift));
        }
        for shift in 1..32 {
            assert!(!is_fold_safe(i32::MIN | 1, shift));
        }
    }

    #[test]
    fn test_signed_mask_below_sign_bit_folds_like_unsigned() {
        // 0x7f: bit 6 shifted by one lands on bit 7, still a real value bit.
        assert!(is_fold_safe(i8::MAX, 1));
        assert!(!is_fold_safe(i8::MAX, 2));
        assert!(is_fold_safe(0x4000i16, 1));
        assert!(!is_fold_safe(0x4000i16, 2));
    }

    #[test]
    fn test_last_shift_needs_single_low_bit() {
        assert!(is_fold_safe(1u8, 7));
        assert!(!is_fold_safe(2u8, 7));
        assert!(is_fold_safe(1u16, 15));
        // (v >> 7) & 1 and v & 0x80 both read the sign bit.
        assert!(is_fold_safe(1i8, 7));
        assert!(!is_fold_safe(2i8, 7));
        assert!(is_fold_safe(1i16, 15));
    }

    #[test]
    fn test_safe_shift_range() {
        assert_eq!(safe_shift_range(0x0fu8), 0..=4);
        assert_eq!(safe_shift_range(0u8), 0..=7);
        assert_eq!(safe_shift_range(u8::MAX), 0..=0);
        assert_eq!(safe_shift_range(0i8), 0..=7);
        assert_eq!(safe_shift_range(1i8), 0..=7);
        assert_eq!(safe_shift_range(0x30i8), 0..=2);
        assert_eq!(safe_shift_range(i8::MIN), 0..=0);
        assert_eq!(safe_shift_range(-1i64), 0..=0);
    }

    #[test]
    fn test_safe_shift_range_matches_predicate() {
        fn check<D: FoldDomain>() {
            for mask in D::values() {
                let range = safe_shift_range(mask);
                for shift in 0..D::BITS {
                    assert_eq!(
                        is_fold_safe(mask, shift),
                        range.contains(&shift),
                        "{} mask {mask} shift {shift}",
                        D::NAME
                    );
                }
            }
        }
        check::<u8>();
        check::<i8>();
        check::<u16>();
        check::<i16>();
    }

    #[test]
    fn test_safe_region_shrinks_with_shift() {
        for mask in i16::values() {
            let mut was_safe = true;
            for shift in 0..16 {
                let safe = is_fold_safe(mask, shift);
                assert!(!safe || was_safe, "mask {mask} safe at {shift} after unsafe");
                was_safe = safe;
            }
        }
    }

    /// Whether the formulas agree on every value of `D`.
    fn agrees_everywhere<D: FoldDomain>(mask: D, shift: u32) -> bool {
        D::values()
            .all(|value| base_formula(value, mask, shift) == folded_formula(value, mask, shift))
    }

    #[test]
    fn test_i8_accepts_every_pair_inside_the_width() {
        for mask in i8::values() {
            let highest = first_set_index(mask) - 1;
            for shift in 0..8 {
                let inside = highest + shift as i32 <= 7;
                assert_eq!(is_fold_safe(mask, shift), inside, "mask {mask} shift {shift}");
                if inside {
                    assert!(agrees_everywhere(mask, shift), "mask {mask} shift {shift}");
                }
            }
        }
    }

    #[test]
    fn test_i8_exact_for_single_bit_masks() {
        for bit in 0..8 {
            let mask = (1u8 << bit) as i8;
            for shift in 0..8 {
                assert_eq!(
                    is_fold_safe(mask, shift),
                    agrees_everywhere(mask, shift),
                    "mask {mask} shift {shift}"
                );
            }
        }
    }

    #[test]
    fn test_i8_matches_sign_clearing_count_below_sign_bit() {
        // For masks without the sign bit, clearing it first changes nothing.
        for mask in 0..=i8::MAX {
            let zeros = (mask as u8 & 0x7f).leading_zeros() as i32;
            for shift in 0..8 {
                let cleared = 8 - shift as i32 >= (zeros - 8).abs();
                assert_eq!(is_fold_safe(mask, shift), cleared, "mask {mask} shift {shift}");
            }
        }
    }
}
