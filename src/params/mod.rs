pub mod chain;
pub mod presets;
pub mod security;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BgvError, Result};
use crate::ring::modular::bit_width;
use crate::ring::prime::{is_prime, largest_prime_congruent_one};

/// Standard deviation of the LWE error distribution.
pub const DEFAULT_NOISE_STD_DEV: f64 = 3.2;

/// Largest supported plaintext modulus, in bits.
pub const MAX_PLAIN_MODULUS_BITS: u32 = 60;

/// Parameters of one level of the modulus chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParameters {
    q: u64,
    level: usize,
    next_level_index: Option<usize>,
}

impl EncryptionParameters {
    /// Ciphertext modulus q_l.
    pub fn q(&self) -> u64 {
        self.q
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Level reached by one modulus switch; `None` at level 0.
    pub fn next_level_index(&self) -> Option<usize> {
        self.next_level_index
    }
}

/// Scheme parameters shared read-only by every other component.
///
/// Level `L = depth` carries the largest modulus and is where encryption
/// happens; level 0 is the bottom of the chain. `depth` counts the modulus
/// switches available, not multiplications: adjacent moduli differ by only
/// 2p, and q_0 is sized for the noise of a single multiplication followed
/// by relinearization and `depth` switches.
#[derive(Clone, Debug)]
pub struct Context {
    ring_degree: usize,
    plain_modulus: u64,
    depth: usize,
    noise_std_dev: f64,
    params: Vec<EncryptionParameters>,
}

impl Context {
    /// Build a context with ring degree `d`, a prime plaintext modulus of
    /// `plain_modulus_bits` bits and `depth` levels above level 0.
    pub fn new(ring_degree: usize, plain_modulus_bits: u32, depth: usize) -> Result<Arc<Self>> {
        ContextBuilder::new()
            .ring_degree(ring_degree)
            .plain_modulus_bits(plain_modulus_bits)
            .depth(depth)
            .build()
    }

    pub fn poly_modulus_degree(&self) -> usize {
        self.ring_degree
    }

    pub fn plain_modulus_value(&self) -> u64 {
        self.plain_modulus
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn noise_std_dev(&self) -> f64 {
        self.noise_std_dev
    }

    /// Parameters of `level`.
    pub fn param(&self, level: usize) -> Result<&EncryptionParameters> {
        self.params.get(level).ok_or(BgvError::UnknownLevel { level, depth: self.depth })
    }

    /// Top of the chain (level L).
    pub fn first_param(&self) -> &EncryptionParameters {
        &self.params[self.depth]
    }

    /// Bottom of the chain (level 0).
    pub fn last_param(&self) -> &EncryptionParameters {
        &self.params[0]
    }

    /// Parameters one modulus switch below `params`.
    pub fn next_param(&self, params: &EncryptionParameters) -> Result<&EncryptionParameters> {
        let next = params.next_level_index()
            .ok_or(BgvError::LevelExhausted { level: params.level() })?;
        self.param(next)
    }

    /// All parameters, indexed by level.
    pub fn params(&self) -> &[EncryptionParameters] {
        &self.params
    }

    /// Moduli q_0, ..., q_L.
    pub fn modulus_chain(&self) -> Vec<u64> {
        self.params.iter().map(EncryptionParameters::q).collect()
    }

    /// Number of binary digits N_l used by the gadget at `level`.
    pub fn gadget_width(&self, level: usize) -> Result<usize> {
        Ok(bit_width(self.param(level)?.q()))
    }
}

/// Builder for [`Context`].
pub struct ContextBuilder {
    ring_degree: usize,
    plain_modulus_bits: u32,
    plain_modulus: Option<u64>,
    depth: usize,
    noise_std_dev: f64,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            ring_degree: 8,
            plain_modulus_bits: 8,
            plain_modulus: None,
            depth: 2,
            noise_std_dev: DEFAULT_NOISE_STD_DEV,
        }
    }

    pub fn ring_degree(mut self, d: usize) -> Self {
        self.ring_degree = d;
        self
    }

    pub fn plain_modulus_bits(mut self, bits: u32) -> Self {
        self.plain_modulus_bits = bits;
        self
    }

    /// Use this prime instead of searching for one. Must be 1 mod 2d.
    pub fn plain_modulus(mut self, p: u64) -> Self {
        self.plain_modulus = Some(p);
        self
    }

    /// Number of modulus switches below the top level.
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn noise_std_dev(mut self, sigma: f64) -> Self {
        self.noise_std_dev = sigma;
        self
    }

    pub fn build(self) -> Result<Arc<Context>> {
        let d = self.ring_degree;
        if !d.is_power_of_two() || d < 2 {
            return Err(BgvError::InvalidRingDegree(d));
        }
        if self.depth < 1 {
            return Err(BgvError::InvalidDepth(self.depth));
        }
        if !(self.noise_std_dev.is_finite() && self.noise_std_dev > 0.0) {
            return Err(BgvError::InvalidParam(format!(
                "noise standard deviation must be positive, got {}",
                self.noise_std_dev
            )));
        }

        let two_d = 2 * d;
        let plain_modulus = match self.plain_modulus {
            Some(p) => {
                if !is_prime(p) || p % two_d as u64 != 1 {
                    return Err(BgvError::InvalidParam(format!(
                        "plaintext modulus {p} must be a prime = 1 mod {two_d}"
                    )));
                }
                p
            }
            None => {
                let bits = self.plain_modulus_bits;
                if bits > MAX_PLAIN_MODULUS_BITS {
                    return Err(BgvError::InvalidParam(format!(
                        "plaintext modulus of {bits} bits exceeds {MAX_PLAIN_MODULUS_BITS}"
                    )));
                }
                largest_prime_congruent_one(bits, two_d as u64)
                    .ok_or(BgvError::PlainModulusTooSmall { bits, two_d })?
            }
        };

        let min_modulus = chain::required_min_modulus(d, plain_modulus, self.depth, self.noise_std_dev);
        let moduli = chain::build_modulus_chain(plain_modulus, self.depth, &min_modulus)?;
        debug!(ring_degree = d, plain_modulus, depth = self.depth, ?moduli, "derived modulus chain");

        let top_bits = moduli.last().map_or(0.0, |&q| (q as f64).log2());
        if !security::check_security(d, top_bits, self.noise_std_dev, 128.0) {
            warn!(
                security_bits = security::estimate_security_bits(d, top_bits, self.noise_std_dev),
                suggested_ring_degree = security::min_ring_degree(top_bits, self.noise_std_dev, 128.0),
                "parameters are below 128-bit security"
            );
        }

        let params = moduli.iter()
            .enumerate()
            .map(|(level, &q)| EncryptionParameters {
                q,
                level,
                next_level_index: level.checked_sub(1),
            })
            .collect();

        Ok(Arc::new(Context {
            ring_degree: d,
            plain_modulus,
            depth: self.depth,
            noise_std_dev: self.noise_std_dev,
            params,
        }))
    }
}
