//! Randomness for key generation and encryption.
//!
//! A [`Sampler`] owns its PRNG; give every worker its own sampler.

pub mod gaussian;
pub mod uniform;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::{BgvError, Result};
use crate::params::DEFAULT_NOISE_STD_DEV;
use crate::ring::Polynomial;

pub use gaussian::GaussianTable;

/// Polynomial sampler over R_q.
#[derive(Clone, Debug)]
pub struct Sampler<R = ChaCha20Rng> {
    rng: R,
    gaussian: GaussianTable,
}

impl Sampler<ChaCha20Rng> {
    /// ChaCha20 seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(ChaCha20Rng::from_os_rng())
    }

    /// Deterministic sampler, for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            gaussian: GaussianTable::new(DEFAULT_NOISE_STD_DEV),
        }
    }

    /// Replace the error standard deviation (default 3.2).
    pub fn with_std_dev(mut self, sigma: f64) -> Self {
        self.gaussian = GaussianTable::new(sigma);
        self
    }

    pub fn gaussian_tail(&self) -> i64 {
        self.gaussian.tail()
    }

    /// Discrete Gaussian coefficients; a negative draw s is stored as q - |s|.
    pub fn sample_gaussian(&mut self, d: usize, q: u64) -> Polynomial {
        Polynomial::from_coeffs(self.gaussian.sample_coeffs(d, q, &mut self.rng), q)
    }

    /// Coefficients uniform in [0, q).
    pub fn sample_uniform(&mut self, d: usize, q: u64) -> Polynomial {
        Polynomial::from_coeffs(uniform::sample_uniform_coeffs(d, q, &mut self.rng), q)
    }

    /// Coefficients uniform in {-1, 0, 1}.
    pub fn sample_ternary(&mut self, d: usize, q: u64) -> Polynomial {
        Polynomial::from_coeffs(uniform::sample_ternary_coeffs(d, q, &mut self.rng), q)
    }

    /// Exactly `h` nonzero ±1 coefficients.
    pub fn sample_hamming(&mut self, d: usize, q: u64, h: usize) -> Result<Polynomial> {
        if h > d {
            return Err(BgvError::InvalidParam(format!(
                "hamming weight {h} exceeds ring degree {d}"
            )));
        }
        Ok(Polynomial::from_coeffs(uniform::sample_hamming_coeffs(d, q, h, &mut self.rng), q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = Sampler::seeded(11);
        let mut b = Sampler::seeded(11);
        assert_eq!(a.sample_uniform(16, 1 << 40), b.sample_uniform(16, 1 << 40));
        assert_eq!(a.sample_gaussian(16, 97), b.sample_gaussian(16, 97));
    }

    #[test]
    fn test_gaussian_poly() {
        let mut sampler = Sampler::seeded(42);
        let poly = sampler.sample_gaussian(1024, 65537);
        assert_eq!(poly.ring_degree(), 1024);
        assert_eq!(poly.modulus(), 65537);
        assert!(poly.infinity_norm() <= sampler.gaussian_tail() as u128);
    }

    #[test]
    fn test_custom_std_dev() {
        let mut sampler = Sampler::seeded(5).with_std_dev(1.0);
        assert_eq!(sampler.gaussian_tail(), 6);
        let poly = sampler.sample_gaussian(256, 1 << 20);
        assert!(poly.infinity_norm() <= 6);
    }

    #[test]
    fn test_hamming_bounds() {
        let mut sampler = Sampler::seeded(1);
        let poly = sampler.sample_hamming(8, 17, 8).unwrap();
        assert!(poly.coeffs().iter().all(|&c| c == 1 || c == 16));
        let err = sampler.sample_hamming(8, 17, 9).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Construction);
    }
}
