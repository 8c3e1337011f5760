/// BN254 Scalar Field (Fr) Element
///
/// p = 21888242871839275222246405745257275088548364400416034343698204186575808495617
///
/// Values are stored as canonical `BigUint`s in `[0, p)`. Circuit
/// construction folds arbitrary-precision constants and prints them in
/// hexadecimal, so an arbitrary-precision representation is used instead of
/// a fixed-limb one.
use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

/// The BN254 scalar field prime, in decimal.
pub const FIELD_PRIME_DECIMAL: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

static MODULUS: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(FIELD_PRIME_DECIMAL.as_bytes(), 10).unwrap()
});

static P_MINUS_2: Lazy<BigUint> = Lazy::new(|| &*MODULUS - 2u32);

/// The field prime `p`.
pub fn modulus() -> &'static BigUint {
    &MODULUS
}

/// An element of the BN254 scalar field, always reduced mod `p`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// The zero element.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// The one element.
    pub fn one() -> Self {
        Self(BigUint::one())
    }

    /// Create from a small u64 value.
    ///
    /// ```
    /// use field::FieldElement;
    ///
    /// let fe = FieldElement::from_u64(42);
    /// assert_eq!(fe.to_decimal_string(), "42");
    /// ```
    pub fn from_u64(val: u64) -> Self {
        Self(BigUint::from(val))
    }

    /// Create from an arbitrary `BigUint`, reducing mod `p`.
    pub fn from_biguint(val: BigUint) -> Self {
        if val < *MODULUS {
            Self(val)
        } else {
            Self(val % &*MODULUS)
        }
    }

    /// Parse from a decimal string. Values ≥ p are reduced.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        BigUint::parse_bytes(s.as_bytes(), 10).map(Self::from_biguint)
    }

    /// Parse from a hex string (with or without a "0x" prefix).
    ///
    /// ```
    /// use field::FieldElement;
    ///
    /// assert_eq!(FieldElement::from_hex_str("0x2a"), Some(FieldElement::from_u64(42)));
    /// assert_eq!(FieldElement::from_hex_str("ff"), Some(FieldElement::from_u64(255)));
    /// assert!(FieldElement::from_hex_str("xyz").is_none());
    /// ```
    pub fn from_hex_str(s: &str) -> Option<Self> {
        let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if hex.is_empty() {
            return None;
        }
        BigUint::parse_bytes(hex.as_bytes(), 16).map(Self::from_biguint)
    }

    /// Check if zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if one.
    #[inline]
    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    /// Check if the value is 0 or 1 (a valid boolean wire value).
    #[inline]
    pub fn is_binary(&self) -> bool {
        self.0 <= BigUint::one()
    }

    /// Modular addition: (self + other) mod p.
    pub fn add(&self, other: &Self) -> Self {
        let sum = &self.0 + &other.0;
        if sum < *MODULUS {
            Self(sum)
        } else {
            Self(sum - &*MODULUS)
        }
    }

    /// Modular subtraction: (self - other) mod p.
    ///
    /// ```
    /// use field::FieldElement;
    ///
    /// let a = FieldElement::from_u64(3);
    /// let b = FieldElement::from_u64(10);
    /// assert_eq!(a.sub(&b).add(&b), a);
    /// ```
    pub fn sub(&self, other: &Self) -> Self {
        if self.0 >= other.0 {
            Self(&self.0 - &other.0)
        } else {
            Self(&self.0 + &*MODULUS - &other.0)
        }
    }

    /// Modular multiplication: (self * other) mod p.
    pub fn mul(&self, other: &Self) -> Self {
        Self((&self.0 * &other.0) % &*MODULUS)
    }

    /// Modular negation: (-self) mod p.
    pub fn neg(&self) -> Self {
        if self.0.is_zero() {
            Self::zero()
        } else {
            Self(&*MODULUS - &self.0)
        }
    }

    /// Modular inverse via Fermat's little theorem (a^(p−2) mod p).
    /// Returns `None` if `self` is zero.
    ///
    /// ```
    /// use field::FieldElement;
    ///
    /// let a = FieldElement::from_u64(7);
    /// assert_eq!(a.mul(&a.inv().unwrap()), FieldElement::one());
    /// assert!(FieldElement::zero().inv().is_none());
    /// ```
    pub fn inv(&self) -> Option<Self> {
        if self.0.is_zero() {
            return None;
        }
        Some(Self(self.0.modpow(&P_MINUS_2, &MODULUS)))
    }

    /// The i-th bit of the canonical value (little-endian).
    pub fn bit(&self, i: usize) -> bool {
        self.0.bit(i as u64)
    }

    /// Whether the canonical value fits in `bits` bits (value < 2^bits).
    ///
    /// ```
    /// use field::FieldElement;
    ///
    /// assert!(FieldElement::from_u64(255).fits_in_bits(8));
    /// assert!(!FieldElement::from_u64(256).fits_in_bits(8));
    /// assert!(FieldElement::zero().fits_in_bits(1));
    /// ```
    pub fn fits_in_bits(&self, bits: usize) -> bool {
        self.0.bits() <= bits as u64
    }

    /// Borrow the canonical value.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Unpadded lowercase hexadecimal, e.g. `"1a"` for 26.
    pub fn to_hex_string(&self) -> String {
        format!("{:x}", self.0)
    }

    /// Canonical decimal string.
    pub fn to_decimal_string(&self) -> String {
        self.0.to_str_radix(10)
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.to_decimal_string())
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
