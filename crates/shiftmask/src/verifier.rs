//! Exhaustive equivalence verification.
//!
//! For a domain `D`, every mask in `D::MIN..=D::MAX` is visited in turn and
//! its shifts `0..D::BITS` are fanned out across the rayon pool, one task
//! per shift. A task whose `(mask, shift)` the predicate accepts walks every
//! value of the domain and compares [`base_formula`] with
//! [`folded_formula`]. The first disagreement is recorded in a shared
//! single-write slot, every worker stops at its next poll, and the run
//! fails with the counterexample.
//!
//! Which counterexample is reported when several workers disagree at once
//! is unspecified.
//!
//! # Example
//! ```ignore
//! use shiftmask::{ExhaustiveVerifier, VerifierConfig};
//!
//! let verifier = ExhaustiveVerifier::new(VerifierConfig::default());
//! let report = verifier.verify::<u8>()?;
//! assert_eq!(report.masks, 256);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::domain::{DomainInfo, DomainKind, FoldDomain};
use crate::error::{Counterexample, Result, VerifyError};
use crate::formula::{base_formula, folded_formula};
use crate::predicate::is_fold_safe;

/// Configuration for exhaustive verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Maximum number of worker threads.
    /// None means use rayon's global pool (typically number of cores).
    pub max_threads: Option<usize>,

    /// Whether to log progress while enumerating masks.
    pub report_progress: bool,

    /// Number of masks between progress lines.
    pub progress_interval: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_threads: None,
            report_progress: false,
            progress_interval: 4096,
        }
    }
}

/// Summary of a domain that verified without disagreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    pub domain: DomainInfo,
    /// Masks enumerated.
    pub masks: u64,
    /// `(mask, shift)` pairs the predicate accepted and that were checked
    /// against every value.
    pub pairs_checked: u64,
    /// `(mask, shift)` pairs the predicate rejected.
    pub pairs_skipped: u64,
    /// `(value, mask, shift)` triples evaluated.
    pub values_checked: u64,
    /// Checked triples for which both formulas were true.
    pub agreeing_true: u64,
}

impl DomainReport {
    pub fn pairs_total(&self) -> u64 {
        self.pairs_checked + self.pairs_skipped
    }
}

/// First-failure slot shared by all workers of a run.
///
/// Written at most once; later disagreements are dropped.
struct FailureSlot {
    tripped: AtomicBool,
    counterexample: Mutex<Option<Counterexample>>,
}

impl FailureSlot {
    fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
            counterexample: Mutex::new(None),
        }
    }

    #[inline]
    fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Relaxed)
    }

    /// Returns true if this call stored the counterexample.
    fn record(&self, cx: Counterexample) -> bool {
        let mut guard = self.counterexample.lock();
        if guard.is_some() {
            return false;
        }
        error!("Counterexample: {}", cx);
        *guard = Some(cx);
        self.tripped.store(true, Ordering::Relaxed);
        true
    }

    fn into_counterexample(self) -> Option<Counterexample> {
        self.counterexample.into_inner()
    }
}

#[derive(Default)]
struct Tally {
    pairs_checked: AtomicU64,
    pairs_skipped: AtomicU64,
    values_checked: AtomicU64,
    agreeing_true: AtomicU64,
}

impl Tally {
    fn into_report(self, domain: DomainInfo, masks: u64) -> DomainReport {
        DomainReport {
            domain,
            masks,
            pairs_checked: self.pairs_checked.into_inner(),
            pairs_skipped: self.pairs_skipped.into_inner(),
            values_checked: self.values_checked.into_inner(),
            agreeing_true: self.agreeing_true.into_inner(),
        }
    }
}

/// Brute-force verifier for the fold-safety predicate.
pub struct ExhaustiveVerifier {
    config: VerifierConfig,
}

impl ExhaustiveVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Verify [`is_fold_safe`] over every `(value, mask, shift)` of `D`.
    pub fn verify<D: FoldDomain>(&self) -> Result<DomainReport> {
        self.verify_with::<D, _>(is_fold_safe::<D>)
    }

    /// Verify an arbitrary predicate over every `(value, mask, shift)` of
    /// `D`.
    ///
    /// Fails with [`VerifyError::NotEnumerable`] for domains wider than the
    /// driver can enumerate instead of reporting them as proven.
    pub fn verify_with<D, P>(&self, predicate: P) -> Result<DomainReport>
    where
        D: FoldDomain,
        P: Fn(D, u32) -> bool + Sync,
    {
        if !D::EXHAUSTIVE {
            return Err(VerifyError::NotEnumerable {
                domain: D::NAME,
                bits: D::BITS,
            });
        }

        match self.build_pool()? {
            Some(pool) => pool.install(|| self.enumerate::<D, P>(&predicate)),
            None => self.enumerate::<D, P>(&predicate),
        }
    }

    /// Verify the domain selected at runtime.
    pub fn verify_kind(&self, kind: DomainKind) -> Result<DomainReport> {
        match kind {
            DomainKind::U8 => self.verify::<u8>(),
            DomainKind::I8 => self.verify::<i8>(),
            DomainKind::U16 => self.verify::<u16>(),
            DomainKind::I16 => self.verify::<i16>(),
            DomainKind::U32 => self.verify::<u32>(),
            DomainKind::I32 => self.verify::<i32>(),
            DomainKind::U64 => self.verify::<u64>(),
            DomainKind::I64 => self.verify::<i64>(),
            DomainKind::U128 => self.verify::<u128>(),
            DomainKind::I128 => self.verify::<i128>(),
        }
    }

    /// Verify each domain in order, stopping at the first failure.
    pub fn run_domains(&self, kinds: &[DomainKind]) -> Result<Vec<DomainReport>> {
        kinds.iter().map(|&kind| self.verify_kind(kind)).collect()
    }

    /// Verify every exhaustively supported domain.
    pub fn run_all(&self) -> Result<Vec<DomainReport>> {
        self.run_domains(&DomainKind::EXHAUSTIVE)
    }

    fn build_pool(&self) -> Result<Option<rayon::ThreadPool>> {
        let Some(max_threads) = self.config.max_threads else {
            return Ok(None);
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()?;
        Ok(Some(pool))
    }

    fn enumerate<D, P>(&self, predicate: &P) -> Result<DomainReport>
    where
        D: FoldDomain,
        P: Fn(D, u32) -> bool + Sync,
    {
        info!("Starting {}...", D::NAME);

        let slot = FailureSlot::new();
        let tally = Tally::default();
        let interval = self.config.progress_interval.max(1);
        let mut masks = 0u64;

        for mask in D::values() {
            if slot.is_tripped() {
                break;
            }

            (0..D::BITS)
                .into_par_iter()
                .for_each(|shift| check_pair(mask, shift, predicate, &slot, &tally));

            masks += 1;
            if self.config.report_progress && masks % interval == 0 {
                debug!(
                    "{}: {} masks, {} pairs checked",
                    D::NAME,
                    masks,
                    tally.pairs_checked.load(Ordering::Relaxed)
                );
            }
        }

        if let Some(cx) = slot.into_counterexample() {
            return Err(cx.into());
        }

        let report = tally.into_report(D::info(), masks);
        debug!(
            "{}: {} pairs checked, {} skipped, {} values",
            D::NAME,
            report.pairs_checked,
            report.pairs_skipped,
            report.values_checked
        );
        info!("...Finished {}.", D::NAME);
        Ok(report)
    }
}

/// Check one `(mask, shift)` pair against every value.
fn check_pair<D, P>(mask: D, shift: u32, predicate: &P, slot: &FailureSlot, tally: &Tally)
where
    D: FoldDomain,
    P: Fn(D, u32) -> bool,
{
    if slot.is_tripped() {
        return;
    }
    if !predicate(mask, shift) {
        trace!("{}: skip mask {} shift {}", D::NAME, mask, shift);
        tally.pairs_skipped.fetch_add(1, Ordering::Relaxed);
        return;
    }

    let mut checked = 0u64;
    let mut agreeing_true = 0u64;
    for value in D::values() {
        if slot.is_tripped() {
            return;
        }
        let base = base_formula(value, mask, shift);
        let folded = folded_formula(value, mask, shift);
        if base != folded {
            slot.record(Counterexample::new(value, mask, shift, base, folded));
            return;
        }
        checked += 1;
        agreeing_true += base as u64;
    }

    tally.pairs_checked.fetch_add(1, Ordering::Relaxed);
    tally.values_checked.fetch_add(checked, Ordering::Relaxed);
    tally.agreeing_true.fetch_add(agreeing_true, Ordering::Relaxed);
}

/// Find a `(value, mask, shift)` the predicate rejects and on which the
/// formulas really disagree.
///
/// Scans masks, then shifts, then values in ascending order and returns the
/// first hit, so the result is deterministic. `None` means every rejected
/// pair was in fact safe.
pub fn find_negative_witness<D, P>(predicate: P) -> Result<Option<Counterexample>>
where
    D: FoldDomain,
    P: Fn(D, u32) -> bool,
{
    if !D::EXHAUSTIVE {
        return Err(VerifyError::NotEnumerable {
            domain: D::NAME,
            bits: D::BITS,
        });
    }

    for mask in D::values() {
        for shift in (0..D::BITS).filter(|&shift| !predicate(mask, shift)) {
            for value in D::values() {
                let base = base_formula(value, mask, shift);
                let folded = folded_formula(value, mask, shift);
                if base != folded {
                    return Ok(Some(Counterexample::new(value, mask, shift, base, folded)));
                }
            }
        }
    }
    Ok(None)
}
