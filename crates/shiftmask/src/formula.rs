//! The two competing bit-test formulas.
//!
//! `base` shifts the runtime value; `folded` moves the shift onto the mask,
//! which is usually a constant and can be pre-shifted at compile time.
//! Both require `shift < D::BITS`.

use crate::domain::FoldDomain;

/// `((value >> shift) & mask) != 0`
#[inline]
pub fn base_formula<D: FoldDomain>(value: D, mask: D, shift: u32) -> bool {
    debug_assert!(shift < D::BITS, "shift {shift} out of range for {}", D::NAME);
    ((value >> shift) & mask) != D::ZERO
}

/// `(value & (mask << shift)) != 0`
#[inline]
pub fn folded_formula<D: FoldDomain>(value: D, mask: D, shift: u32) -> bool {
    debug_assert!(shift < D::BITS, "shift {shift} out of range for {}", D::NAME);
    (value & (mask << shift)) != D::ZERO
}
