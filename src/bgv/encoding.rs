use std::sync::Arc;

use crate::bgv::Plaintext;
use crate::error::{BgvError, Result};
use crate::params::Context;
use crate::ring::{centered, Polynomial};

/// Coefficient encoder: value i becomes the coefficient of X^i.
///
/// Values are signed and must lie in (-p/2, p/2]; negatives are stored as
/// p - |v| and decoded back to their centered form.
pub struct Encoder {
    context: Arc<Context>,
}

impl Encoder {
    pub fn new(context: &Arc<Context>) -> Self {
        Self { context: Arc::clone(context) }
    }

    /// Encode up to d values, padding with zeros.
    pub fn encode(&self, values: &[i64]) -> Result<Plaintext> {
        let d = self.context.poly_modulus_degree();
        let p = self.context.plain_modulus_value();
        if values.len() > d {
            return Err(BgvError::DimensionMismatch { expected: d, got: values.len() });
        }

        let in_range = |v: i64| centered((v as i128).rem_euclid(p as i128) as u64, p) == v as i128;
        if let Some(&v) = values.iter().find(|&&v| !in_range(v)) {
            return Err(BgvError::InvalidParam(format!(
                "value {v} outside the plaintext range of modulus {p}"
            )));
        }

        let mut padded = values.to_vec();
        padded.resize(d, 0);
        Plaintext::new(Polynomial::from_signed(&padded, p))
    }

    /// Centered coefficients of `plaintext`, d values.
    pub fn decode(&self, plaintext: &Plaintext) -> Result<Vec<i64>> {
        let p = self.context.plain_modulus_value();
        if plaintext.modulus() != p {
            return Err(BgvError::ModulusMismatch { expected: p, got: plaintext.modulus() });
        }
        Ok(plaintext.poly().centered_coeffs().into_iter().map(|c| c as i64).collect())
    }
}
