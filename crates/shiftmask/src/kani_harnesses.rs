//! Kani proof harnesses for the widths the brute-force driver cannot reach.
//!
//! With symbolic `value`, `mask` and `shift < BITS`, each harness proves
//! that an accepted pair makes the two formulas agree. These harnesses are
//! only compiled when running `cargo kani`.
//!
//! ```bash
//! cargo kani -p shiftmask --harness verify_fold_safe_u32
//! cargo kani -p shiftmask --harness verify_split_leading_zeros
//! ```

#[cfg(kani)]
mod kani_proofs {
    use crate::domain::split_leading_zeros;
    use crate::formula::{base_formula, folded_formula};
    use crate::predicate::is_fold_safe;

    macro_rules! fold_safe_harness {
        ($($name:ident: $ty:ty;)*) => {
            $(
                #[kani::proof]
                fn $name() {
                    let value: $ty = kani::any();
                    let mask: $ty = kani::any();
                    let shift: u32 = kani::any();
                    kani::assume(shift < <$ty>::BITS);

                    if is_fold_safe(mask, shift) {
                        assert_eq!(
                            base_formula(value, mask, shift),
                            folded_formula(value, mask, shift)
                        );
                    }
                }
            )*
        };
    }

    fold_safe_harness! {
        verify_fold_safe_u32: u32;
        verify_fold_safe_i32: i32;
        verify_fold_safe_u64: u64;
        verify_fold_safe_i64: i64;
    }

    #[kani::proof]
    fn verify_split_leading_zeros() {
        let pattern: u128 = kani::any();
        assert_eq!(split_leading_zeros(pattern), pattern.leading_zeros());
    }

    /// A mask carrying the sign bit folds at shift zero and nowhere else.
    #[kani::proof]
    fn verify_sign_bit_masks_fold_only_unshifted() {
        let low: i32 = kani::any();
        let shift: u32 = kani::any();
        kani::assume(shift > 0 && shift < 32);
        let mask = low | i32::MIN;
        assert!(is_fold_safe(mask, 0));
        assert!(!is_fold_safe(mask, shift));
    }
}
