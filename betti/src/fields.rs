//! Traits for types that act as coefficients in a matrix.
//! The prime field `Z_p` is provided as a const generic struct, with aliases up to [`F13`].

use std::fmt::{Debug, Display};
use std::ops::{Add, Mul, Neg, Sub};

use num::{One, Zero};

use crate::BettiError;

/// A commutative ring of coefficients.
/// Zero is a genuine element here: sparse structures drop it rather than the type forbidding it.
pub trait Coefficient:
    Copy
    + Eq
    + Debug
    + Display
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + From<i64>
{
}

impl Coefficient for i64 {}

pub trait Field: Coefficient {
    /// Fails with [`BettiError::DivisionByZero`] on the additive identity.
    fn try_inverse(self) -> Result<Self, BettiError>;

    fn try_div(self, rhs: Self) -> Result<Self, BettiError> {
        Ok(self * rhs.try_inverse()?)
    }
}

const fn is_prime(p: u32) -> bool {
    if p < 2 {
        return false;
    }
    let p = p as u64;
    let mut divisor = 2;
    while divisor * divisor <= p {
        if p % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

/// Const generic struct for the finite field `Z_p`.
/// The inner value is always a residue in `[0, P)`.
///
/// Using a non-prime `P` is a compile-time error as soon as an element is constructed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModP<const P: u32>(u32);

pub type F2 = ModP<2>;
pub type F3 = ModP<3>;
pub type F5 = ModP<5>;
pub type F7 = ModP<7>;
pub type F11 = ModP<11>;
pub type F13 = ModP<13>;

impl<const P: u32> ModP<P> {
    const PRIME_MODULUS: () = assert!(is_prime(P), "ModP requires a prime modulus");

    pub fn new(value: i64) -> Self {
        let () = Self::PRIME_MODULUS;
        Self(value.rem_euclid(i64::from(P)) as u32)
    }

    pub const fn modulus() -> u32 {
        P
    }

    pub fn value(self) -> u32 {
        self.0
    }

    fn pow(self, mut exponent: u32) -> Self {
        let modulus = u64::from(P);
        let mut base = u64::from(self.0);
        let mut acc = 1 % modulus;
        while exponent > 0 {
            if exponent & 1 == 1 {
                acc = acc * base % modulus;
            }
            base = base * base % modulus;
            exponent >>= 1;
        }
        Self(acc as u32)
    }
}

impl<const P: u32> Debug for ModP<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl<const P: u32> Display for ModP<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<const P: u32> From<i64> for ModP<P> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<const P: u32> Add<ModP<P>> for ModP<P> {
    type Output = ModP<P>;

    fn add(self, rhs: ModP<P>) -> Self::Output {
        let sum = (u64::from(self.0) + u64::from(rhs.0)) % u64::from(P);
        Self(sum as u32)
    }
}

impl<const P: u32> Neg for ModP<P> {
    type Output = ModP<P>;

    // For P=2 this is the identity
    fn neg(self) -> Self::Output {
        Self((P - self.0) % P)
    }
}

impl<const P: u32> Sub<ModP<P>> for ModP<P> {
    type Output = ModP<P>;

    fn sub(self, rhs: ModP<P>) -> Self::Output {
        self + (-rhs)
    }
}

impl<const P: u32> Mul<ModP<P>> for ModP<P> {
    type Output = ModP<P>;

    fn mul(self, rhs: ModP<P>) -> Self::Output {
        let product = u64::from(self.0) * u64::from(rhs.0) % u64::from(P);
        Self(product as u32)
    }
}

impl<const P: u32> Zero for ModP<P> {
    fn zero() -> Self {
        Self::new(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl<const P: u32> One for ModP<P> {
    fn one() -> Self {
        Self::new(1)
    }
}

impl<const P: u32> Coefficient for ModP<P> {}

impl<const P: u32> Field for ModP<P> {
    fn try_inverse(self) -> Result<Self, BettiError> {
        if self.is_zero() {
            return Err(BettiError::DivisionByZero);
        }
        // Fermat: a^(p-2) = a^(-1)
        Ok(self.pow(P - 2))
    }
}
