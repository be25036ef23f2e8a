//! Integers modulo a prime.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

/// An element of Z/PZ, stored reduced in `[0, P)`.
///
/// Any modulus from 2 up to `u64::MAX` is accepted; a smaller `P` fails to
/// compile once an element is built. `P` should be prime for the field
/// axioms to hold. Products are reduced through `u128`. Arithmetic is exact,
/// which makes results of different summation orders directly comparable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModInt<const P: u64>(u64);

impl<const P: u64> ModInt<P> {
    const VALID_MODULUS: () = assert!(P >= 2, "modulus must be at least 2");

    pub fn new(value: u64) -> Self {
        let () = Self::VALID_MODULUS;
        ModInt(value % P)
    }

    /// Maps a signed value to its residue.
    pub fn from_i64(value: i64) -> Self {
        let () = Self::VALID_MODULUS;
        ModInt(i128::from(value).rem_euclid(i128::from(P)) as u64)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl<const P: u64> From<u64> for ModInt<P> {
    fn from(value: u64) -> Self {
        ModInt::new(value)
    }
}

impl<const P: u64> fmt::Debug for ModInt<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (mod {})", self.0, P)
    }
}

impl<const P: u64> fmt::Display for ModInt<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const P: u64> Add for ModInt<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (sum, carry) = self.0.overflowing_add(rhs.0);
        ModInt(if carry || sum >= P {
            sum.wrapping_sub(P)
        } else {
            sum
        })
    }
}

impl<const P: u64> Sub for ModInt<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        ModInt(if self.0 >= rhs.0 {
            self.0 - rhs.0
        } else {
            P - (rhs.0 - self.0)
        })
    }
}

impl<const P: u64> Mul for ModInt<P> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        ModInt((u128::from(self.0) * u128::from(rhs.0) % u128::from(P)) as u64)
    }
}

impl<const P: u64> Neg for ModInt<P> {
    type Output = Self;

    fn neg(self) -> Self {
        ModInt::zero() - self
    }
}

impl<const P: u64> Zero for ModInt<P> {
    fn zero() -> Self {
        let () = Self::VALID_MODULUS;
        ModInt(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl<const P: u64> One for ModInt<P> {
    fn one() -> Self {
        let () = Self::VALID_MODULUS;
        ModInt(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type F7 = ModInt<7>;

    #[test]
    fn arithmetic_wraps_modulo_p() {
        assert_eq!(F7::new(5) + F7::new(4), F7::new(2));
        assert_eq!(F7::new(2) - F7::new(5), F7::new(4));
        assert_eq!(F7::new(3) * F7::new(5), F7::new(1));
        assert_eq!(-F7::new(3), F7::new(4));
        assert_eq!(F7::from_i64(-1), F7::new(6));
    }

    #[test]
    fn identities() {
        let x = F7::new(6);
        assert_eq!(x + F7::zero(), x);
        assert_eq!(x * F7::one(), x);
        assert!(F7::new(14).is_zero());
    }

    #[test]
    fn moduli_beyond_32_bits() {
        // 2^61 - 1 and the largest prime below 2^64.
        type M61 = ModInt<{ (1 << 61) - 1 }>;
        type M64 = ModInt<18_446_744_073_709_551_557>;

        let a = M61::new((1 << 61) - 2);
        assert_eq!(a * a, M61::new(1));
        assert_eq!(a + a, M61::new((1 << 61) - 3));

        let b = M64::new(u64::MAX - 60);
        assert_eq!(b + b, M64::new(u64::MAX - 62));
        assert_eq!(b * b, M64::new(4));
        assert_eq!(M64::new(3) - b, M64::new(5));
        assert_eq!(M64::from_i64(-2), b);
        assert_eq!(M64::from_i64(i64::MIN).value(), (1 << 63) - 59);
    }
}
