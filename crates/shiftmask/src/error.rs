//! Error types for fold verification

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{DomainInfo, FoldDomain};

/// Result type alias for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;

/// A concrete `(value, mask, shift)` triple on which the base and folded
/// formulas disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counterexample {
    pub domain: DomainInfo,
    pub value: i128,
    pub mask: i128,
    pub shift: u32,
    /// `((value >> shift) & mask) != 0`
    pub base: bool,
    /// `(value & (mask << shift)) != 0`
    pub folded: bool,
}

impl Counterexample {
    pub fn new<D: FoldDomain>(value: D, mask: D, shift: u32, base: bool, folded: bool) -> Self {
        Self {
            domain: D::info(),
            value: value.to_i128(),
            mask: mask.to_i128(),
            shift,
            base,
            folded,
        }
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: value: {} ({}), shift: {}, mask: {} ({}), base: {}, folded: {}",
            self.domain,
            self.value,
            self.domain.bit_pattern(self.value),
            self.shift,
            self.mask,
            self.domain.bit_pattern(self.mask),
            self.base,
            self.folded
        )
    }
}

/// Errors that can occur while verifying fold safety
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The predicate declared a pair safe that the formulas disagree on
    #[error("counterexample found: {0}")]
    Counterexample(Box<Counterexample>),

    /// No domain descriptor exists for this width/signedness
    #[error("unsupported domain width: {bits}-bit {}", signedness(.signed))]
    UnsupportedWidth { bits: u32, signed: bool },

    /// Domain exists but its value space is too large to enumerate
    #[error("domain {domain} ({bits}-bit) cannot be verified exhaustively")]
    NotEnumerable { domain: &'static str, bits: u32 },

    /// Domain name did not parse
    #[error("unknown domain: '{0}'")]
    UnknownDomain(String),

    /// Worker pool could not be created
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl VerifyError {
    /// The counterexample carried by this error, if any.
    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            VerifyError::Counterexample(cx) => Some(cx.as_ref()),
            _ => None,
        }
    }
}

fn signedness(signed: &bool) -> &'static str {
    if *signed {
        "signed"
    } else {
        "unsigned"
    }
}

impl From<Counterexample> for VerifyError {
    fn from(cx: Counterexample) -> Self {
        VerifyError::Counterexample(Box::new(cx))
    }
}
