use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, instrument};
use zeroize::{Zeroize, Zeroizing};

use crate::bgv::keys::{PublicKey, RelinKeys, SecretKey, SwitchKeys};
use crate::error::{BgvError, Result};
use crate::params::Context;
use crate::ring::{PolyMatrix, Polynomial};
use crate::sampling::Sampler;

/// Distribution of the secret polynomial t.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SecretDistribution {
    /// Discrete Gaussian with the context's standard deviation.
    #[default]
    Gaussian,
    /// Uniform over {-1, 0, 1}.
    Ternary,
    /// Exactly `h` coefficients in {-1, 1}.
    Hamming(usize),
}

/// Generates the secret key on construction and every derived key on demand.
pub struct KeyGenerator<R = ChaCha20Rng> {
    context: Arc<Context>,
    sampler: Sampler<R>,
    secret_key: SecretKey,
}

impl KeyGenerator<ChaCha20Rng> {
    /// Key generator with a Gaussian secret and an OS-seeded sampler.
    pub fn new(context: &Arc<Context>) -> Result<Self> {
        Self::with_sampler(context, Sampler::from_os_rng(), SecretDistribution::default())
    }
}

impl<R: Rng> KeyGenerator<R> {
    pub fn with_sampler(
        context: &Arc<Context>,
        sampler: Sampler<R>,
        distribution: SecretDistribution,
    ) -> Result<Self> {
        let mut sampler = sampler.with_std_dev(context.noise_std_dev());
        let secret_key = gen_secret_key(context, &mut sampler, distribution)?;
        Ok(Self {
            context: Arc::clone(context),
            sampler,
            secret_key,
        })
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Encryption key `(b, B)` with `b = -B t + p e`, generated afresh at every level.
    #[instrument(skip_all)]
    pub fn create_public_key(&mut self) -> Result<PublicKey> {
        let keys = (0..=self.context.depth())
            .map(|level| {
                let (d, q) = self.ring_at(level)?;
                self.gadget_encrypt(level, &PolyMatrix::new(1, 1, d, q))
            })
            .collect::<Result<Vec<_>>>()?;
        PublicKey::new(keys)
    }

    /// Per level, row r encrypts `2^r · t^2` for r < bit_width(q_l).
    #[instrument(skip_all)]
    pub fn create_relin_keys(&mut self) -> Result<RelinKeys> {
        let mut keys = Vec::with_capacity(self.context.depth() + 1);
        for level in 0..=self.context.depth() {
            let width = self.context.gadget_width(level)?;
            let t = &self.secret_key.key(level)?[(1, 0)];
            let t_sq = Zeroizing::new(t.mul(t)?);
            let payload = Zeroizing::new(PolyMatrix::column(powers_of_two(&t_sq, width))?);
            keys.push(self.gadget_encrypt(level, &payload)?);
        }
        debug!(levels = keys.len(), "generated relinearization keys");
        RelinKeys::new(keys)
    }

    /// Keys that move a ciphertext from this generator's secret to `other`'s.
    ///
    /// Per level, row `r·N + c` encrypts `sk[r] · 2^c` under `other`'s t,
    /// where `sk = (1, t)` is this generator's key and N = bit_width(q_l).
    #[instrument(skip_all)]
    pub fn create_switch_keys(&mut self, other: &SecretKey) -> Result<SwitchKeys> {
        if other.count() != self.secret_key.count() {
            return Err(BgvError::LevelMismatch {
                expected: self.secret_key.count(),
                got: other.count(),
            });
        }

        let mut keys = Vec::with_capacity(self.context.depth() + 1);
        for level in 0..=self.context.depth() {
            let own = self.secret_key.key(level)?;
            let target = other.key(level)?;
            check_same_ring(own, target)?;

            let width = self.context.gadget_width(level)?;
            let mut payload = Vec::with_capacity(2 * width);
            payload.extend(powers_of_two(&own[(0, 0)], width));
            payload.extend(powers_of_two(&own[(1, 0)], width));
            let payload = Zeroizing::new(PolyMatrix::column(payload)?);

            keys.push(self.encrypt_rows(&target[(1, 0)], &payload)?);
        }
        debug!(levels = keys.len(), "generated switch keys");
        SwitchKeys::new(keys)
    }

    fn ring_at(&self, level: usize) -> Result<(usize, u64)> {
        Ok((self.context.poly_modulus_degree(), self.context.param(level)?.q()))
    }

    /// Encrypt each row of the N x 1 `payload` under this generator's secret at `level`.
    fn gadget_encrypt(&mut self, level: usize, payload: &PolyMatrix) -> Result<PolyMatrix> {
        let t = Zeroizing::new(self.secret_key.key(level)?[(1, 0)].clone());
        self.encrypt_rows(&t, payload)
    }

    /// `(b | B)` with B uniform, e Gaussian and `b = -B t + p e + W`.
    /// Every intermediate that depends on t, e or W is wiped on drop.
    fn encrypt_rows(&mut self, t: &Polynomial, payload: &PolyMatrix) -> Result<PolyMatrix> {
        let (d, q) = (t.ring_degree(), t.modulus());
        let p = self.context.plain_modulus_value();
        let rows = payload.rows();

        let uniform = (0..rows).map(|_| self.sampler.sample_uniform(d, q)).collect();
        let b_mat = PolyMatrix::column(uniform)?;
        let noise = (0..rows).map(|_| self.sampler.sample_gaussian(d, q)).collect();
        let e = Zeroizing::new(PolyMatrix::column(noise)?);

        let t_col = Zeroizing::new(PolyMatrix::column(vec![t.clone()])?);
        let bt = Zeroizing::new(b_mat.mul(&t_col)?);
        let pe = Zeroizing::new(e.scalar_mul(p));
        let masked = Zeroizing::new(pe.sub(&bt)?);
        let b = masked.add(payload)?;

        let mut key = Vec::with_capacity(2 * rows);
        for r in 0..rows {
            key.push(b[(r, 0)].clone());
            key.push(b_mat[(r, 0)].clone());
        }
        PolyMatrix::from_polys(rows, 2, key)
    }
}

fn gen_secret_key<R: Rng>(
    context: &Context,
    sampler: &mut Sampler<R>,
    distribution: SecretDistribution,
) -> Result<SecretKey> {
    let d = context.poly_modulus_degree();
    let top = context.first_param().q();
    let t = match distribution {
        SecretDistribution::Gaussian => sampler.sample_gaussian(d, top),
        SecretDistribution::Ternary => sampler.sample_ternary(d, top),
        SecretDistribution::Hamming(h) => sampler.sample_hamming(d, top, h)?,
    };
    let top_key = PolyMatrix::column(vec![Polynomial::constant(d, top, 1), t])?;

    let keys = context.params()
        .iter()
        .map(|params| top_key.reset(2, 1, d, params.q()))
        .collect::<Result<Vec<_>>>()?;
    SecretKey::new(keys)
}

/// `[poly, 2·poly, 4·poly, ...]`, `width` entries.
fn powers_of_two(poly: &Polynomial, width: usize) -> Vec<Polynomial> {
    let mut out = Vec::with_capacity(width);
    let mut current = poly.clone();
    for _ in 0..width {
        let next = current.scalar_mul(2);
        out.push(current);
        current = next;
    }
    current.zeroize();
    out
}

fn check_same_ring(a: &PolyMatrix, b: &PolyMatrix) -> Result<()> {
    if a.ring_degree() != b.ring_degree() {
        return Err(BgvError::DimensionMismatch { expected: a.ring_degree(), got: b.ring_degree() });
    }
    if a.modulus() != b.modulus() {
        return Err(BgvError::ModulusMismatch { expected: a.modulus(), got: b.modulus() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::presets;

    fn keygen(seed: u64) -> KeyGenerator {
        let ctx = presets::toy().unwrap();
        KeyGenerator::with_sampler(&ctx, Sampler::seeded(seed), SecretDistribution::Gaussian).unwrap()
    }

    /// `b + B·t - W` for every row, centered.
    fn residual(key: &PolyMatrix, t: &Polynomial, payload: &PolyMatrix) -> Vec<Vec<i128>> {
        (0..key.rows())
            .map(|r| {
                let bt = key[(r, 1)].mul(t).unwrap();
                key[(r, 0)].add(&bt).unwrap().sub(&payload[(r, 0)]).unwrap().centered_coeffs()
            })
            .collect()
    }

    #[test]
    fn test_secret_key_same_across_levels() {
        let kg = keygen(1);
        let sk = kg.secret_key();
        assert_eq!(sk.count(), 3);
        let top = sk.key(2).unwrap()[(1, 0)].centered_coeffs();
        for level in 0..3 {
            let key = sk.key(level).unwrap();
            assert_eq!(key.modulus(), kg.context().param(level).unwrap().q());
            assert_eq!(key[(0, 0)].coeffs()[0], 1);
            assert_eq!(key[(1, 0)].centered_coeffs(), top);
        }
    }

    #[test]
    fn test_public_key_relation() {
        let mut kg = keygen(2);
        let pk = kg.create_public_key().unwrap();
        let p = kg.context().plain_modulus_value() as i128;
        assert_eq!(pk.count(), 3);
        for level in 0..3 {
            let key = pk.data(level).unwrap();
            assert_eq!(key.rows(), 1);
            let t = &kg.secret_key().key(level).unwrap()[(1, 0)];
            let zero = PolyMatrix::new(1, 1, key.ring_degree(), key.modulus());
            for row in residual(key, t, &zero) {
                // p·e with |e| <= 20
                assert!(row.iter().all(|&c| c % p == 0 && c.abs() <= 20 * p));
            }
        }
    }

    #[test]
    fn test_relin_key_shape_and_relation() {
        let mut kg = keygen(3);
        let rk = kg.create_relin_keys().unwrap();
        let p = kg.context().plain_modulus_value() as i128;
        for level in 0..3 {
            let key = rk.data(level).unwrap();
            let width = kg.context().gadget_width(level).unwrap();
            assert_eq!(key.rows(), width);

            let t = &kg.secret_key().key(level).unwrap()[(1, 0)];
            let payload = PolyMatrix::column(powers_of_two(&t.mul(t).unwrap(), width)).unwrap();
            for row in residual(key, t, &payload) {
                assert!(row.iter().all(|&c| c % p == 0 && c.abs() <= 20 * p));
            }
        }
    }

    #[test]
    fn test_switch_key_shape() {
        let mut a = keygen(4);
        let b = keygen(5);
        let wk = a.create_switch_keys(b.secret_key()).unwrap();
        for level in 0..3 {
            assert_eq!(wk.data(level).unwrap().rows(), 2 * a.context().gadget_width(level).unwrap());
        }
    }

    #[test]
    fn test_switch_key_rejects_other_context() {
        let mut a = keygen(6);
        let ctx = presets::small().unwrap();
        let b = KeyGenerator::with_sampler(&ctx, Sampler::seeded(7), SecretDistribution::Ternary).unwrap();
        let err = a.create_switch_keys(b.secret_key()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Mismatch);
    }

    #[test]
    fn test_secret_distributions() {
        let ctx = presets::toy().unwrap();
        let kg = KeyGenerator::with_sampler(&ctx, Sampler::seeded(8), SecretDistribution::Hamming(3)).unwrap();
        let t = &kg.secret_key().key(0).unwrap()[(1, 0)];
        assert_eq!(t.coeffs().iter().filter(|&&c| c != 0).count(), 3);
        assert!(t.infinity_norm() <= 1);

        assert!(KeyGenerator::with_sampler(&ctx, Sampler::seeded(8), SecretDistribution::Hamming(9)).is_err());
    }
}
