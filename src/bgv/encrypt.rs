use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::bgv::keys::{PublicKey, SecretKey};
use crate::bgv::{Ciphertext, Plaintext};
use crate::error::{BgvError, Result};
use crate::params::Context;
use crate::ring::modular::bit_width;
use crate::ring::{PolyMatrix, Polynomial};
use crate::sampling::Sampler;

/// Public-key encryption at the top of the modulus chain.
pub struct Encryptor<'a, R = ChaCha20Rng> {
    context: Arc<Context>,
    public_key: &'a PublicKey,
    sampler: Sampler<R>,
}

impl<'a> Encryptor<'a, ChaCha20Rng> {
    pub fn new(context: &Arc<Context>, public_key: &'a PublicKey) -> Result<Self> {
        Self::with_sampler(context, public_key, Sampler::from_os_rng())
    }
}

impl<'a, R: Rng> Encryptor<'a, R> {
    pub fn with_sampler(context: &Arc<Context>, public_key: &'a PublicKey, sampler: Sampler<R>) -> Result<Self> {
        if public_key.count() != context.depth() + 1 {
            return Err(BgvError::LevelMismatch {
                expected: context.depth() + 1,
                got: public_key.count(),
            });
        }
        Ok(Self {
            context: Arc::clone(context),
            public_key,
            sampler: sampler.with_std_dev(context.noise_std_dev()),
        })
    }

    /// `ct = (m, 0) + p·e + pkᵀ·r` over R_{q_L}.
    pub fn encrypt(&mut self, plaintext: &Plaintext) -> Result<Ciphertext> {
        let params = *self.context.first_param();
        let (d, q) = (self.context.poly_modulus_degree(), params.q());
        let p = self.context.plain_modulus_value();
        check_plaintext(plaintext, d, p)?;

        let pk = self.public_key.data(params.level())?;
        if pk.modulus() != q {
            return Err(BgvError::ModulusMismatch { expected: q, got: pk.modulus() });
        }

        let m = PolyMatrix::column(vec![plaintext.poly().reset(d, q)?, Polynomial::zero(d, q)])?;
        let e = PolyMatrix::column(vec![self.sampler.sample_gaussian(d, q), self.sampler.sample_gaussian(d, q)])?;
        let r = PolyMatrix::column(vec![self.sampler.sample_gaussian(d, q)])?;

        let data = m.add(&e.scalar_mul(p))?.add(&pk.t().mul(&r)?)?;
        Ciphertext::new(data, params)
    }
}

pub(crate) fn check_plaintext(plaintext: &Plaintext, d: usize, p: u64) -> Result<()> {
    if plaintext.modulus() != p {
        return Err(BgvError::ModulusMismatch { expected: p, got: plaintext.modulus() });
    }
    if plaintext.poly().ring_degree() != d {
        return Err(BgvError::DimensionMismatch { expected: d, got: plaintext.poly().ring_degree() });
    }
    Ok(())
}

/// Secret-key decryption at any level.
pub struct Decryptor<'a> {
    context: Arc<Context>,
    secret_key: &'a SecretKey,
}

impl<'a> Decryptor<'a> {
    pub fn new(context: &Arc<Context>, secret_key: &'a SecretKey) -> Self {
        Self {
            context: Arc::clone(context),
            secret_key,
        }
    }

    /// `⟨ct, sk⟩ mod q_l`, centered and reduced into R_p.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Plaintext> {
        let phase = self.phase(ciphertext)?;
        let p = self.context.plain_modulus_value();
        Plaintext::new(phase.reset(self.context.poly_modulus_degree(), p)?)
    }

    /// Bits of headroom left before decryption fails: `⌊log2(q/2)⌋` minus
    /// the bit length of the largest phase coefficient. Zero once exhausted.
    pub fn noise_budget(&self, ciphertext: &Ciphertext) -> Result<u32> {
        let phase = self.phase(ciphertext)?;
        let q = ciphertext.params().q();
        let capacity = bit_width(q / 2) as u32 - 1;
        let norm = phase.infinity_norm();
        let used = 128 - norm.leading_zeros();
        Ok(capacity.saturating_sub(used))
    }

    fn phase(&self, ciphertext: &Ciphertext) -> Result<Polynomial> {
        let level = ciphertext.level();
        let expected = self.context.param(level)?;
        if expected.q() != ciphertext.params().q() {
            return Err(BgvError::ModulusMismatch { expected: expected.q(), got: ciphertext.params().q() });
        }
        if expected != ciphertext.params() {
            return Err(BgvError::Malformed(format!(
                "ciphertext parameters disagree with the context at level {level}"
            )));
        }
        let key = self.secret_key.key_for_size(level, ciphertext.size())?;
        let inner = ciphertext.data().t().mul(&key)?;
        Ok(inner[(0, 0)].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bgv::{Encoder, KeyGenerator, SecretDistribution};
    use crate::params::presets;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let ctx = presets::toy().unwrap();
        let mut kg = KeyGenerator::with_sampler(&ctx, Sampler::seeded(1), SecretDistribution::Gaussian).unwrap();
        let pk = kg.create_public_key().unwrap();
        let encoder = Encoder::new(&ctx);
        let mut encryptor = Encryptor::with_sampler(&ctx, &pk, Sampler::seeded(2)).unwrap();
        let decryptor = Decryptor::new(&ctx, kg.secret_key());

        let values = [3, -1, 4, -1, 5, -9, 2, 6];
        let ct = encryptor.encrypt(&encoder.encode(&values).unwrap()).unwrap();
        assert_eq!(ct.level(), 2);
        assert_eq!(ct.size(), 2);
        assert_eq!(ct.params().q(), ctx.first_param().q());

        let pt = decryptor.decrypt(&ct).unwrap();
        assert_eq!(encoder.decode(&pt).unwrap(), values.to_vec());
    }

    #[test]
    fn test_noise_budget_positive_when_fresh() {
        let ctx = presets::toy().unwrap();
        let mut kg = KeyGenerator::with_sampler(&ctx, Sampler::seeded(3), SecretDistribution::Gaussian).unwrap();
        let pk = kg.create_public_key().unwrap();
        let mut encryptor = Encryptor::with_sampler(&ctx, &pk, Sampler::seeded(4)).unwrap();
        let decryptor = Decryptor::new(&ctx, kg.secret_key());

        let ct = encryptor.encrypt(&Encoder::new(&ctx).encode(&[1]).unwrap()).unwrap();
        let budget = decryptor.noise_budget(&ct).unwrap();
        assert!(budget > 10, "budget = {budget}");
        assert!(budget < 64);
    }

    #[test]
    fn test_encrypt_rejects_foreign_plaintext() {
        let ctx = presets::toy().unwrap();
        let mut kg = KeyGenerator::with_sampler(&ctx, Sampler::seeded(5), SecretDistribution::Gaussian).unwrap();
        let pk = kg.create_public_key().unwrap();
        let mut encryptor = Encryptor::with_sampler(&ctx, &pk, Sampler::seeded(6)).unwrap();

        let wrong_modulus = Plaintext::new(Polynomial::zero(8, 193)).unwrap();
        assert!(matches!(encryptor.encrypt(&wrong_modulus), Err(BgvError::ModulusMismatch { .. })));
        let wrong_degree = Plaintext::new(Polynomial::zero(4, 241)).unwrap();
        assert!(matches!(encryptor.encrypt(&wrong_degree), Err(BgvError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_decrypt_rejects_forged_level_link() {
        let ctx = presets::toy().unwrap();
        let mut kg = KeyGenerator::with_sampler(&ctx, Sampler::seeded(8), SecretDistribution::Gaussian).unwrap();
        let pk = kg.create_public_key().unwrap();
        let mut encryptor = Encryptor::with_sampler(&ctx, &pk, Sampler::seeded(9)).unwrap();
        let decryptor = Decryptor::new(&ctx, kg.secret_key());
        let ct = encryptor.encrypt(&Encoder::new(&ctx).encode(&[7]).unwrap()).unwrap();

        // the serialized parameters end with the next level index as a u64
        let mut bytes = crate::serialization::to_bytes(&ct).unwrap();
        let len = bytes.len();
        bytes[len - 8..].copy_from_slice(&0u64.to_le_bytes());
        let forged: Ciphertext = crate::serialization::from_bytes(&bytes).unwrap();
        assert_eq!(forged.params().next_level_index(), Some(0));

        assert!(matches!(decryptor.decrypt(&forged), Err(BgvError::Malformed(_))));
        assert!(matches!(decryptor.noise_budget(&forged), Err(BgvError::Malformed(_))));
    }

    #[test]
    fn test_encryptor_checks_key_levels() {
        let ctx = presets::toy().unwrap();
        let other = presets::small().unwrap();
        let mut kg = KeyGenerator::with_sampler(&other, Sampler::seeded(7), SecretDistribution::Gaussian).unwrap();
        let pk = kg.create_public_key().unwrap();
        assert!(matches!(Encryptor::new(&ctx, &pk), Err(BgvError::LevelMismatch { .. })));
    }
}
