use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{BgvError, Result};
use crate::ring::modular::{add_mod, centered, mul_mod, negate_mod, sub_mod};

/// Polynomial in coefficient representation over Z_q[X]/(X^d + 1).
///
/// Coefficients always live in [0, q); a negative value v is stored as q - |v|.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolynomial")]
pub struct Polynomial {
    coeffs: Vec<u64>,
    modulus: u64,
}

#[derive(Deserialize)]
struct RawPolynomial {
    coeffs: Vec<u64>,
    modulus: u64,
}

impl TryFrom<RawPolynomial> for Polynomial {
    type Error = BgvError;

    fn try_from(raw: RawPolynomial) -> Result<Self> {
        if raw.modulus < 2 {
            return Err(BgvError::Malformed(format!("polynomial modulus {}", raw.modulus)));
        }
        if let Some(&c) = raw.coeffs.iter().find(|&&c| c >= raw.modulus) {
            return Err(BgvError::Malformed(format!(
                "coefficient {c} not reduced modulo {}",
                raw.modulus
            )));
        }
        Ok(Self { coeffs: raw.coeffs, modulus: raw.modulus })
    }
}

impl Polynomial {
    /// Create a zero polynomial with `d` coefficients in Z_q.
    ///
    /// # Panics
    ///
    /// Panics if `modulus < 2`. The same holds for every constructor below;
    /// use [`Polynomial::reset`] to move into a modulus that is not yet validated.
    pub fn zero(d: usize, modulus: u64) -> Self {
        assert!(modulus > 1, "modulus must be > 1");
        Self {
            coeffs: vec![0u64; d],
            modulus,
        }
    }

    /// Create the constant polynomial `value`.
    pub fn constant(d: usize, modulus: u64, value: u64) -> Self {
        let mut p = Self::zero(d, modulus);
        if d > 0 {
            p.coeffs[0] = value % modulus;
        }
        p
    }

    /// Create a polynomial from coefficients (reduced mod q).
    pub fn from_coeffs(coeffs: Vec<u64>, modulus: u64) -> Self {
        assert!(modulus > 1, "modulus must be > 1");
        let mut p = Self { coeffs, modulus };
        p.reduce();
        p
    }

    /// Create a polynomial from signed coefficients, mapping v < 0 to q - |v|.
    pub fn from_signed(values: &[i64], modulus: u64) -> Self {
        assert!(modulus > 1, "modulus must be > 1");
        let m = modulus as i128;
        let coeffs = values.iter()
            .map(|&v| (v as i128).rem_euclid(m) as u64)
            .collect();
        Self { coeffs, modulus }
    }

    /// Ring degree d (number of coefficients).
    pub fn ring_degree(&self) -> usize {
        self.coeffs.len()
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    /// Coefficient of X^index.
    pub fn get(&self, index: usize) -> Option<u64> {
        self.coeffs.get(index).copied()
    }

    /// Overwrite the coefficient of X^index with `value mod q`.
    pub fn set(&mut self, index: usize, value: u64) -> Result<()> {
        let d = self.ring_degree();
        let slot = self.coeffs.get_mut(index)
            .ok_or(BgvError::DimensionMismatch { expected: d, got: index + 1 })?;
        *slot = value % self.modulus;
        Ok(())
    }

    fn reduce(&mut self) {
        for c in self.coeffs.iter_mut() {
            *c %= self.modulus;
        }
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.ring_degree() != other.ring_degree() {
            return Err(BgvError::DimensionMismatch {
                expected: self.ring_degree(),
                got: other.ring_degree(),
            });
        }
        if self.modulus != other.modulus {
            return Err(BgvError::ModulusMismatch {
                expected: self.modulus,
                got: other.modulus,
            });
        }
        Ok(())
    }

    /// Add two polynomials in Z_q[X]/(X^d+1).
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let coeffs = self.coeffs.iter()
            .zip(other.coeffs.iter())
            .map(|(&a, &b)| add_mod(a, b, self.modulus))
            .collect();
        Ok(Self { coeffs, modulus: self.modulus })
    }

    /// Subtract two polynomials in Z_q[X]/(X^d+1).
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let coeffs = self.coeffs.iter()
            .zip(other.coeffs.iter())
            .map(|(&a, &b)| sub_mod(a, b, self.modulus))
            .collect();
        Ok(Self { coeffs, modulus: self.modulus })
    }

    /// In-place addition for operands already known to be compatible.
    pub(crate) fn add_assign_unchecked(&mut self, other: &Self) {
        debug_assert!(self.check_compatible(other).is_ok());
        let q = self.modulus;
        for (a, &b) in self.coeffs.iter_mut().zip(other.coeffs.iter()) {
            *a = add_mod(*a, b, q);
        }
    }

    /// Negate polynomial.
    pub fn neg(&self) -> Self {
        let coeffs = self.coeffs.iter()
            .map(|&a| negate_mod(a, self.modulus))
            .collect();
        Self { coeffs, modulus: self.modulus }
    }

    /// Schoolbook multiply in Z_q[X]/(X^d+1).
    ///
    /// The full product is accumulated into 2d - 1 slots; the high half is then
    /// folded back with X^d = -1.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(self.mul_unchecked(other))
    }

    pub(crate) fn mul_unchecked(&self, other: &Self) -> Self {
        let d = self.ring_degree();
        let q = self.modulus;
        if d == 0 {
            return Self::zero(0, q);
        }
        let mut full = vec![0u64; 2 * d - 1];

        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in other.coeffs.iter().enumerate() {
                if b == 0 {
                    continue;
                }
                full[i + j] = add_mod(full[i + j], mul_mod(a, b, q), q);
            }
        }

        let (low, high) = full.split_at_mut(d);
        for (k, &h) in high.iter().enumerate() {
            low[k] = sub_mod(low[k], h, q);
        }
        full.truncate(d);

        Self { coeffs: full, modulus: q }
    }

    /// Multiply by a scalar.
    pub fn scalar_mul(&self, scalar: u64) -> Self {
        let q = self.modulus;
        let coeffs = self.coeffs.iter()
            .map(|&c| mul_mod(c, scalar, q))
            .collect();
        Self { coeffs, modulus: q }
    }

    /// Move the polynomial to a new degree and modulus.
    ///
    /// Each coefficient is first centered around the old modulus, so small
    /// signed values keep their sign: `c > q_old/2` becomes
    /// `new - ((q_old - c) mod new)`, anything else `c mod new`.
    pub fn reset(&self, new_degree: usize, new_modulus: u64) -> Result<Self> {
        if new_modulus < 2 {
            return Err(BgvError::InvalidParam(format!("modulus must be >= 2, got {new_modulus}")));
        }
        let old = self.modulus;
        let half = old / 2;
        let coeffs = (0..new_degree)
            .map(|i| match self.coeffs.get(i) {
                Some(&c) if c > half => negate_mod((old - c) % new_modulus, new_modulus),
                Some(&c) => c % new_modulus,
                None => 0,
            })
            .collect();
        Ok(Self { coeffs, modulus: new_modulus })
    }

    /// Check if all coefficients are zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    /// Get centered representation: map [0, q) -> (-q/2, q/2]
    pub fn centered_coeffs(&self) -> Vec<i128> {
        self.coeffs.iter().map(|&c| centered(c, self.modulus)).collect()
    }

    /// Largest absolute value among the centered coefficients.
    pub fn infinity_norm(&self) -> u128 {
        self.coeffs.iter()
            .map(|&c| centered(c, self.modulus).unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Overwrites every coefficient with zero and keeps the ring shape.
impl Zeroize for Polynomial {
    fn zeroize(&mut self) {
        self.coeffs.as_mut_slice().zeroize();
    }
}
