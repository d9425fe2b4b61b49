use std::cmp::Ordering;

use serde_json::Number as JsonNumber;

use crate::CanonicalizeError;

/// A JSON number with exact integer semantics.
///
/// Integers in the `i64`/`u64` range are stored exactly; other values are
/// kept as finite doubles. Integral doubles within `±2^53` are stored as
/// integers, so `5.0` equals `5` and renders as `5`.
#[derive(Clone, Copy, Debug)]
pub struct Number(Repr);

#[derive(Clone, Copy, Debug)]
enum Repr {
    Int(i128),
    Float(f64),
}

/// Largest magnitude at which every integer has an exact `f64`.
const EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

impl Number {
    /// Creates a new [`Number`] after validating finiteness.
    ///
    /// ```
    /// # use jcmp_core::Number;
    /// let num = Number::new(42.0)?;
    /// assert_eq!(num.get(), 42.0);
    /// assert_eq!(num, Number::from(42_i64));
    /// # Ok::<(), jcmp_core::CanonicalizeError>(())
    /// ```
    pub fn new(value: f64) -> Result<Self, CanonicalizeError> {
        if !value.is_finite() {
            return Err(CanonicalizeError::NotFinite { value });
        }
        if value.fract() == 0.0 && value.abs() <= EXACT_F64_INT {
            // Exact: the magnitude is within the contiguous integer range of f64.
            return Ok(Self(Repr::Int(value as i128)));
        }
        Ok(Self(Repr::Float(value)))
    }

    /// Returns the nearest floating-point value.
    #[must_use]
    pub fn get(self) -> f64 {
        match self.0 {
            Repr::Int(value) => value as f64,
            Repr::Float(value) => value,
        }
    }

    /// Indicates whether the number is stored as an exact integer.
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self.0, Repr::Int(_))
    }

    /// Orders two numbers. Integers compare exactly, including against
    /// integral doubles outside the exact `f64` range.
    ///
    /// ```
    /// # use jcmp_core::Number;
    /// use std::cmp::Ordering;
    /// let big = Number::from(9_007_199_254_740_993_u64);
    /// let below = Number::from(9_007_199_254_740_992_u64);
    /// assert_eq!(big.total_cmp(below), Ordering::Greater);
    /// ```
    #[must_use]
    pub fn total_cmp(self, other: Self) -> Ordering {
        match (self.0, other.0) {
            (Repr::Int(a), Repr::Int(b)) => a.cmp(&b),
            (Repr::Float(a), Repr::Float(b)) => a.total_cmp(&b),
            (Repr::Int(a), Repr::Float(b)) => cmp_int_float(a, b),
            (Repr::Float(a), Repr::Int(b)) => cmp_int_float(b, a).reverse(),
        }
    }

    /// Converts the number into a `serde_json::Number`, keeping integers exact.
    ///
    /// ```
    /// # use jcmp_core::Number;
    /// assert_eq!(Number::new(5.0)?.to_json_number().to_string(), "5");
    /// assert_eq!(Number::new(1.5)?.to_json_number().to_string(), "1.5");
    /// assert_eq!(Number::from(u64::MAX).to_json_number().to_string(), "18446744073709551615");
    /// # Ok::<(), jcmp_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn to_json_number(self) -> JsonNumber {
        match self.0 {
            Repr::Int(value) => {
                if let Ok(small) = i64::try_from(value) {
                    JsonNumber::from(small)
                } else if let Ok(large) = u64::try_from(value) {
                    JsonNumber::from(large)
                } else {
                    // Int only ever holds i64 or u64 values.
                    JsonNumber::from(0)
                }
            }
            // Finite by construction.
            Repr::Float(value) => {
                JsonNumber::from_f64(value).unwrap_or_else(|| JsonNumber::from(0))
            }
        }
    }
}

/// Compares an integer with a finite double without rounding the integer.
fn cmp_int_float(int: i128, float: f64) -> Ordering {
    // 2^126 keeps the cast exact and covers every stored integer.
    const I128_SAFE: f64 = 85_070_591_730_234_615_865_843_651_857_942_052_864.0;
    if float.fract() == 0.0 && float.abs() < I128_SAFE {
        int.cmp(&(float as i128))
    } else {
        // Here the double is either non-integral, so smaller than 2^52, or
        // beyond every stored integer; rounding the integer keeps the order.
        (int as f64).total_cmp(&float)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(*other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(*other)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(Repr::Int(i128::from(value)))
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self(Repr::Int(i128::from(value)))
    }
}

impl TryFrom<&JsonNumber> for Number {
    type Error = CanonicalizeError;

    fn try_from(value: &JsonNumber) -> Result<Self, Self::Error> {
        if let Some(int) = value.as_i64() {
            return Ok(Self::from(int));
        }
        if let Some(uint) = value.as_u64() {
            return Ok(Self::from(uint));
        }
        match value.as_f64() {
            Some(float) => Self::new(float),
            None => Err(CanonicalizeError::NumberOutOfRange { value: value.to_string() }),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json_number())
    }
}
