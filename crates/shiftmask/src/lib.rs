//! Shift/mask folding: a fold-safety predicate and an exhaustive verifier.
//!
//! The two formulas
//!
//! ```text
//! base(value, mask, shift)   = ((value >> shift) & mask) != 0
//! folded(value, mask, shift) = (value & (mask << shift)) != 0
//! ```
//!
//! are interchangeable only for some `(mask, shift)` pairs. Folding moves
//! the shift off the runtime value and onto a (usually constant) mask.
//! [`is_fold_safe`] decides from the mask and shift alone whether the fold
//! is valid for every value, and [`ExhaustiveVerifier`] proves it by brute
//! force over every `(value, mask, shift)` of the 8- and 16-bit domains.
//!
//! # Wider Domains
//!
//! 32-, 64- and 128-bit domains share the predicate but are too large to
//! enumerate. Requesting an exhaustive run for them fails with
//! [`VerifyError::NotEnumerable`]; they are covered by property tests and,
//! under `cargo kani`, by the harnesses in `kani_harnesses`.

pub mod domain;
pub mod error;
pub mod formula;
pub mod predicate;
pub mod verifier;

mod kani_harnesses;


pub use domain::{split_leading_zeros, DomainInfo, DomainKind, FoldDomain};
pub use error::{Counterexample, Result, VerifyError};
pub use formula::{base_formula, folded_formula};
pub use predicate::{first_set_index, is_fold_safe, safe_shift_range};
pub use verifier::{
    find_negative_witness, DomainReport, ExhaustiveVerifier, VerifierConfig,
};

/// Verify every exhaustively supported domain with the default
/// configuration.
///
/// Returns the first counterexample found, if any. The 16-bit domains take
/// minutes even in release builds; the matching tests are ignored by default
/// and run with `cargo test --release -- --ignored`.
pub fn run_all_verifications() -> Result<()> {
    ExhaustiveVerifier::new(VerifierConfig::default()).run_all()?;
    Ok(())
}
