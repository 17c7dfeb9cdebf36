//! Integer domains under verification.
//!
//! A domain is a fixed (width, signedness) pair. [`FoldDomain`] is the
//! descriptor every verified integer type implements: bit width, bounds,
//! the full inclusive value range, and a leading-zero count taken over a
//! fixed native register. The fold-safety predicate is written once against
//! this trait; the per-width differences live entirely in the constants.
//!
//! [`DomainKind`] is the runtime counterpart used to pick domains by name or
//! by width (for example from the command line).

use std::fmt;
use std::ops::{BitAnd, RangeInclusive, Shl, Shr};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, VerifyError};

/// Static metadata describing a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomainInfo {
    /// Rust type name (`"i8"`, `"u16"`, ...).
    pub name: &'static str,
    /// Bit width of the type.
    pub bits: u32,
    /// Whether the type is signed.
    pub signed: bool,
    /// Smallest representable value.
    pub min: i128,
    /// Largest representable value.
    ///
    /// `u128::MAX` does not fit and saturates at `i128::MAX`.
    pub max: i128,
}

impl DomainInfo {
    /// Render a value's raw bit pattern at this domain's width.
    pub fn bit_pattern(&self, value: i128) -> String {
        let digits = (self.bits / 4) as usize;
        let pattern = if self.bits == 128 {
            value as u128
        } else {
            (value as u128) & ((1u128 << self.bits) - 1)
        };
        format!("{:#0width$x}", pattern, width = digits + 2)
    }
}

impl fmt::Display for DomainInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = if self.signed { "signed" } else { "unsigned" };
        write!(f, "{} ({}-bit {})", self.name, self.bits, class)
    }
}

/// Descriptor capability for an integer type the fold predicate supports.
pub trait FoldDomain:
    Copy
    + Eq
    + Send
    + Sync
    + fmt::Debug
    + fmt::Display
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
    + BitAnd<Output = Self>
    + 'static
{
    /// Iterator over every representable value, `MIN..=MAX`.
    type Values: Iterator<Item = Self> + Send;

    const NAME: &'static str;
    const BITS: u32;
    const SIGNED: bool;
    const MIN: Self;
    const MAX: Self;
    const ZERO: Self;

    /// Width of the register [`FoldDomain::native_leading_zeros`] counts in.
    const NATIVE_BITS: u32;

    /// Whether the brute-force driver can enumerate this domain.
    const EXHAUSTIVE: bool;

    /// Leading zeros of the raw bit pattern after zero-extension into the
    /// native register. Includes the `NATIVE_BITS - BITS` excess.
    fn native_leading_zeros(self) -> u32;

    /// Every value of the domain, both endpoints included.
    fn values() -> Self::Values;

    /// Numeric value widened to `i128`, saturating at `i128::MAX` (only
    /// reachable for `u128`).
    fn to_i128(self) -> i128;

    fn info() -> DomainInfo {
        DomainInfo {
            name: Self::NAME,
            bits: Self::BITS,
            signed: Self::SIGNED,
            min: Self::MIN.to_i128(),
            max: Self::MAX.to_i128(),
        }
    }
}

/// Leading-zero count of a 128-bit pattern built from two 64-bit halves.
///
/// Counts the high word first and chains into the low word only when the
/// high word is entirely zero.
#[inline]
pub fn split_leading_zeros(pattern: u128) -> u32 {
    let high = (pattern >> 64) as u64;
    let low = pattern as u64;
    if high != 0 {
        high.leading_zeros()
    } else {
        u64::BITS + low.leading_zeros()
    }
}

macro_rules! impl_fold_domain {
    ($($ty:ty => $unsigned:ty, $native:ty, $lz:path, signed = $signed:expr, exhaustive = $exhaustive:expr;)*) => {
        $(
            impl FoldDomain for $ty {
                type Values = RangeInclusive<$ty>;

                const NAME: &'static str = stringify!($ty);
                const BITS: u32 = <$ty>::BITS;
                const SIGNED: bool = $signed;
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;
                const ZERO: Self = 0;
                const NATIVE_BITS: u32 = <$native>::BITS;
                const EXHAUSTIVE: bool = $exhaustive;

                #[inline]
                fn native_leading_zeros(self) -> u32 {
                    $lz(self as $unsigned as $native)
                }

                #[inline]
                fn values() -> Self::Values {
                    <$ty>::MIN..=<$ty>::MAX
                }

                #[inline]
                fn to_i128(self) -> i128 {
                    i128::try_from(self).unwrap_or(i128::MAX)
                }
            }
        )*
    };
}

impl_fold_domain! {
    u8 => u8, u32, u32::leading_zeros, signed = false, exhaustive = true;
    i8 => u8, u32, u32::leading_zeros, signed = true, exhaustive = true;
    u16 => u16, u32, u32::leading_zeros, signed = false, exhaustive = true;
    i16 => u16, u32, u32::leading_zeros, signed = true, exhaustive = true;
    u32 => u32, u32, u32::leading_zeros, signed = false, exhaustive = false;
    i32 => u32, u32, u32::leading_zeros, signed = true, exhaustive = false;
    u64 => u64, u64, u64::leading_zeros, signed = false, exhaustive = false;
    i64 => u64, u64, u64::leading_zeros, signed = true, exhaustive = false;
    u128 => u128, u128, split_leading_zeros, signed = false, exhaustive = false;
    i128 => u128, u128, split_leading_zeros, signed = true, exhaustive = false;
}

/// Runtime selector for a supported domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DomainKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    U128,
    I128,
}

impl DomainKind {
    /// Domains the brute-force driver proves, in run order.
    pub const EXHAUSTIVE: [DomainKind; 4] =
        [DomainKind::I8, DomainKind::I16, DomainKind::U8, DomainKind::U16];

    /// Look up the domain for a bit width and signedness.
    ///
    /// Fails with [`VerifyError::UnsupportedWidth`] for widths without a
    /// descriptor rather than falling back to a neighbouring width.
    pub fn from_width(bits: u32, signed: bool) -> Result<Self> {
        let kind = match (bits, signed) {
            (8, false) => DomainKind::U8,
            (8, true) => DomainKind::I8,
            (16, false) => DomainKind::U16,
            (16, true) => DomainKind::I16,
            (32, false) => DomainKind::U32,
            (32, true) => DomainKind::I32,
            (64, false) => DomainKind::U64,
            (64, true) => DomainKind::I64,
            (128, false) => DomainKind::U128,
            (128, true) => DomainKind::I128,
            _ => return Err(VerifyError::UnsupportedWidth { bits, signed }),
        };
        Ok(kind)
    }

    pub fn info(self) -> DomainInfo {
        match self {
            DomainKind::U8 => u8::info(),
            DomainKind::I8 => i8::info(),
            DomainKind::U16 => u16::info(),
            DomainKind::I16 => i16::info(),
            DomainKind::U32 => u32::info(),
            DomainKind::I32 => i32::info(),
            DomainKind::U64 => u64::info(),
            DomainKind::I64 => i64::info(),
            DomainKind::U128 => u128::info(),
            DomainKind::I128 => i128::info(),
        }
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn is_exhaustive(self) -> bool {
        Self::EXHAUSTIVE.contains(&self)
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DomainKind {
    type Err = VerifyError;

    /// Parses `u8`/`i16`-style names; `byte`, `sbyte`, `short` and `ushort`
    /// are accepted as aliases.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "byte" => return Ok(DomainKind::U8),
            "sbyte" => return Ok(DomainKind::I8),
            "short" => return Ok(DomainKind::I16),
            "ushort" => return Ok(DomainKind::U16),
            _ => {}
        }

        let (signed, digits) = if let Some(rest) = lower.strip_prefix('u') {
            (false, rest)
        } else if let Some(rest) = lower.strip_prefix('i') {
            (true, rest)
        } else {
            return Err(VerifyError::UnknownDomain(s.to_string()));
        };
        let bits: u32 = digits
            .parse()
            .map_err(|_| VerifyError::UnknownDomain(s.to_string()))?;
        Self::from_width(bits, signed)
    }
}
