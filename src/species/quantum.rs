//! Quantum-number primitives shared by atomic and molecular terms.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::validation::payload::{self, Context};
use crate::validation::{ErrorKind, FieldPath};

/// Highest orbital angular momentum with a spectroscopic letter (H).
pub const MAX_ORBITAL_L: u32 = 5;

/// Largest spin or total angular momentum accepted in a payload.
pub const MAX_ANGULAR_MOMENTUM: u32 = 1000;

/// Non-negative multiple of one half, stored doubled so equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HalfInteger(u32);

impl HalfInteger {
    /// Zero angular momentum.
    pub const ZERO: Self = Self(0);

    /// Build from twice the value, `from_doubled(3)` is 3/2.
    pub const fn from_doubled(doubled: u32) -> Self {
        Self(doubled)
    }

    /// Build from a whole number.
    ///
    /// Values above `u32::MAX / 2` saturate.
    pub const fn from_integer(n: u32) -> Self {
        Self(n.saturating_mul(2))
    }

    /// Parse a floating-point value; `None` unless it is a non-negative multiple of 0.5.
    pub fn from_f64(value: f64) -> Option<Self> {
        let doubled = value * 2.0;
        if !value.is_finite() || value < 0.0 || doubled.fract() != 0.0 || doubled > f64::from(u32::MAX) {
            return None;
        }
        Some(Self(doubled as u32))
    }

    /// Twice the value.
    pub fn doubled(self) -> u32 {
        self.0
    }

    /// Spin multiplicity `2S + 1`.
    pub fn multiplicity(self) -> u64 {
        u64::from(self.0) + 1
    }

    /// Returns true for whole numbers.
    pub fn is_integral(self) -> bool {
        self.0 % 2 == 0
    }

    /// The value as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl fmt::Display for HalfInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integral() {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}/2", self.0)
        }
    }
}

impl Serialize for HalfInteger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_integral() {
            serializer.serialize_u32(self.0 / 2)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

/// Spatial parity of an atomic term, `1` (even) or `-1` (odd) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    /// `P = 1`
    Even,
    /// `P = -1`, rendered as `^o`
    Odd,
}

impl Parity {
    /// Parity of `n` electrons in an orbital with angular momentum `l`.
    pub fn of_orbital(l: u32, occupance: u32) -> Self {
        if l % 2 == 0 || occupance % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// Product of two parities.
    pub fn combine(self, other: Parity) -> Self {
        if self == other {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// `1` or `-1`.
    pub fn as_i8(self) -> i8 {
        match self {
            Parity::Even => 1,
            Parity::Odd => -1,
        }
    }

    /// Suffix marking odd terms.
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Parity::Even => "",
            Parity::Odd => "^o",
        }
    }
}

impl Serialize for Parity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

/// All total angular momenta reachable by coupling `a` and `b`, from `a + b`
/// down to `|a - b|` in unit steps.
/// Momenta above the largest representable value are left out.
pub fn momenta(a: HalfInteger, b: HalfInteger) -> Vec<HalfInteger> {
    let cap = u64::from(u32::MAX);
    let mut max = u64::from(a.0) + u64::from(b.0);
    if max > cap {
        // keep the parity of a + b
        max -= (max - cap + 1) / 2 * 2;
    }
    let min = u64::from(a.0.abs_diff(b.0));
    (min..=max)
        .rev()
        .step_by(2)
        .filter_map(|doubled| u32::try_from(doubled).ok())
        .map(HalfInteger)
        .collect()
}

/// Returns true if `total` can result from coupling `a` and `b`, i.e.
/// `|a - b| <= total <= a + b` in unit steps.
pub fn couples(a: HalfInteger, b: HalfInteger, total: HalfInteger) -> bool {
    let sum = u64::from(a.0) + u64::from(b.0);
    let total = u64::from(total.0);
    u64::from(a.0.abs_diff(b.0)) <= total && total <= sum && (sum - total) % 2 == 0
}

pub(crate) fn render_momenta(values: &[HalfInteger]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn decode_half_integer(
    value: &Value,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<HalfInteger> {
    let n = payload::number(value, path, ctx)?;
    match HalfInteger::from_f64(n) {
        Some(h) if h.doubled() <= 2 * MAX_ANGULAR_MOMENTUM => Some(h),
        Some(_) => {
            ctx.push(
                path,
                ErrorKind::QuantumNumber,
                format!("must be at most {}, found {}", MAX_ANGULAR_MOMENTUM, n),
            );
            None
        }
        None => {
            ctx.push(
                path,
                ErrorKind::QuantumNumber,
                format!("must be a non-negative multiple of 0.5, found {}", n),
            );
            None
        }
    }
}

pub(crate) fn decode_parity(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Parity> {
    match payload::integer(value, path, ctx)? {
        1 => Some(Parity::Even),
        -1 => Some(Parity::Odd),
        other => {
            ctx.push(path, ErrorKind::QuantumNumber, format!("parity must be 1 or -1, found {}", other));
            None
        }
    }
}

/// Orbital angular momentum in `0..=max`, used for atomic `L`/`l` and molecular `Lambda`.
pub(crate) fn decode_bounded(
    value: &Value,
    path: &FieldPath,
    max: u32,
    ctx: &mut Context<'_>,
) -> Option<u32> {
    let n = payload::unsigned(value, path, ErrorKind::QuantumNumber, ctx)?;
    if n > max {
        ctx.push(path, ErrorKind::QuantumNumber, format!("must be at most {}, found {}", max, n));
        return None;
    }
    Some(n)
}
